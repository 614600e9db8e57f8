//! Initialize a new post collection

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::{SiteConfig, DEFAULT_CONFIG};
use crate::content::loader::write_post;
use crate::content::Post;
use crate::{helpers, Blog, CONFIG_FILE};

const SAMPLE_BODY: &str = r#"
This is your first post. Every post starts with a front-matter block:
`title` and `date` are required, and the date must carry a UTC offset.

```c
/* Code in a post is quoted, never compiled. */
int main(void) { return 0; }
```

Run `postkit check` after editing to validate every post.
"#;

/// Initialize a new collection in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }

    fs::create_dir_all(target_dir)?;
    fs::write(&config_path, DEFAULT_CONFIG)?;

    let blog = Blog::with_config(target_dir.to_path_buf(), SiteConfig::default());
    fs::create_dir_all(&blog.posts_dir)?;

    let mut post = Post::new("Hello World", helpers::now_in(&blog.config.timezone)?);
    post.body = SAMPLE_BODY.to_string();
    let sample_path = blog.posts_dir.join("hello-world.md");
    write_post(&sample_path, &post)?;

    tracing::debug!("Wrote sample post {:?}", sample_path);
    Ok(())
}
