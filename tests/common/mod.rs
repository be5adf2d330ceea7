use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TREASURE_TRANSCRIPT: &str = "\
1
00:00:00,000 --> 00:00:02,000
Welcome back to the show.

2
00:00:02,000 --> 00:00:04,000
Tonight we hunt for

3
00:00:04,000 --> 00:00:06,000
<i>Treasure!</i>

4
00:00:06,000 --> 00:00:08,000
Everyone loves treasure

5
00:00:08,000 --> 00:00:10,000
and I mean real

6
00:00:10,000 --> 00:00:12,000
Buried gold.

7
00:00:12,000 --> 00:00:14,000
The treasure was gone

8
00:00:14,000 --> 00:00:16,000
and all that was left

9
00:00:16,000 --> 00:00:18,000
Was a tiny map.

10
00:00:18,000 --> 00:00:20,000
Goodbye.
";

/// Scratch directory holding the transcript, frequency table and config of
/// one test, plus an isolated XDG config home.
pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_home(&self) -> PathBuf {
        self.path().join("xdg-config")
    }

    pub fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn transcript(&self) -> Result<PathBuf> {
        self.write("show.srt", TREASURE_TRANSCRIPT)
    }

    pub fn frequency_table(&self) -> Result<PathBuf> {
        self.write("freq.txt", "# word count\ntreasure 40\ngoodbye 90000\n")
    }

    pub fn config_file(&self) -> PathBuf {
        self.path().join("finder.toml")
    }
}
