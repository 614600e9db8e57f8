#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

pub const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/posts");

pub struct TestEnv {
    pub site_dir: TempDir,
}

impl TestEnv {
    /// An empty site directory with no configuration
    pub fn new() -> Self {
        Self {
            site_dir: TempDir::new().expect("failed to create site_dir"),
        }
    }

    /// A site whose posts directory holds a copy of the fixture posts
    pub fn with_fixtures() -> Self {
        let env = Self::new();
        let posts = env.posts_dir();
        fs::create_dir_all(&posts).unwrap();
        for entry in fs::read_dir(FIXTURES).unwrap() {
            let entry = entry.unwrap();
            fs::copy(entry.path(), posts.join(entry.file_name())).unwrap();
        }
        env
    }

    pub fn root(&self) -> &Path {
        self.site_dir.path()
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.root().join("source").join("_posts")
    }

    /// Write a post file relative to the posts directory
    pub fn write_post(&self, name: &str, content: &str) -> PathBuf {
        let path = self.posts_dir().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read_post(&self, name: &str) -> String {
        fs::read_to_string(self.posts_dir().join(name)).unwrap()
    }

    /// Build a postkit Command pre-configured with --cwd = site_dir.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("postkit"));
        cmd.arg("--cwd").arg(self.root()).env_remove("RUST_LOG");
        cmd
    }
}
