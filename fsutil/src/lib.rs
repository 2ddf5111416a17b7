use serde::de::DeserializeOwned;
use std::{
    fs::{self, File, OpenOptions},
    io::{BufReader, Write as _},
    path::Path,
};

pub mod error {
    use std::{io, path::PathBuf};

    pub type Result<T> = std::result::Result<T, self::Error>;

    type Msg = &'static str;

    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        #[error("{0} ({1}): {2}")]
        SingleIO(Msg, PathBuf, #[source] io::Error),

        #[error("Cannot deserialize from JSON (src='{0}'): {1}")]
        DeserializeFromJson(PathBuf, #[source] serde_json::Error),
    }

    impl Error {
        pub fn io_kind(&self) -> Option<io::ErrorKind> {
            match self {
                Error::SingleIO(_, _, e) => Some(e.kind()),
                Error::DeserializeFromJson(..) => None,
            }
        }
    }
}
pub use error::{Error, Result};

#[must_use]
pub fn mkdir_all(path: impl AsRef<Path>) -> Result<()> {
    let dir = path.as_ref();
    fs::create_dir_all(dir).map_err(|e| Error::SingleIO("Cannot create dir", dir.to_owned(), e))
}

#[must_use]
pub fn write<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    fs::write(&filepath, contents)
        .map_err(|e| Error::SingleIO("Cannot write file", filepath.as_ref().to_owned(), e))
}

/// Appends `contents` to the file, creating it when absent.
#[must_use]
pub fn append<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    let filepath = filepath.as_ref();
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(filepath)
        .map_err(|e| Error::SingleIO("Cannot open file for append", filepath.to_owned(), e))?;
    f.write_all(contents.as_ref())
        .map_err(|e| Error::SingleIO("Cannot append to file", filepath.to_owned(), e))
}

#[must_use]
pub fn read_to_string(filepath: impl AsRef<Path>) -> Result<String> {
    fs::read_to_string(&filepath)
        .map_err(|e| Error::SingleIO("Cannot read file", filepath.as_ref().to_owned(), e))
}

#[must_use]
pub fn remove_file(filepath: impl AsRef<Path>) -> Result<()> {
    fs::remove_file(&filepath)
        .map_err(|e| Error::SingleIO("Cannot remove file", filepath.as_ref().to_owned(), e))
}

/// Reads the whole file and then removes it, whether or not the read succeeded.
///
/// Invalid UTF-8 is replaced with U+FFFD.
#[must_use]
pub fn take_to_string(filepath: impl AsRef<Path>) -> Result<String> {
    let filepath = filepath.as_ref();
    let bytes = fs::read(filepath)
        .map_err(|e| Error::SingleIO("Cannot read file", filepath.to_owned(), e));
    if filepath.exists() {
        self::remove_file(filepath)?;
    }
    Ok(String::from_utf8_lossy(&bytes?).into_owned())
}

#[must_use]
pub fn read_json_with_deserialize<P, T>(filepath: P) -> Result<T>
where
    P: AsRef<Path>,
    T: DeserializeOwned,
{
    let filepath = filepath.as_ref();
    let f = File::open(filepath)
        .map_err(|e| Error::SingleIO("Cannot read file", filepath.to_owned(), e))?;
    serde_json::from_reader(BufReader::new(f))
        .map_err(|e| Error::DeserializeFromJson(filepath.to_owned(), e))
}
