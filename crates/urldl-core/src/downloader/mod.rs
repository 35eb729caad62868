//! URL downloader: names the file, fetches the bytes, writes them to disk.
//!
//! `UrlDownloader` is built from one `FilenameExtractor` and one
//! `ResourceFetcher` and has no protocol knowledge of its own. Errors from
//! either stage are returned unchanged inside `DownloadError`.

mod error;

pub use error::{DownloadError, FailureKind};

use crate::config::WriteMode;
use crate::fetch::ResourceFetcher;
use crate::storage;
use crate::url_model::FilenameExtractor;
use std::path::{Path, PathBuf};

pub struct UrlDownloader<E, F> {
    extractor: E,
    fetcher: F,
    output_dir: PathBuf,
    write_mode: WriteMode,
}

impl<E, F> UrlDownloader<E, F>
where
    E: FilenameExtractor,
    F: ResourceFetcher,
{
    /// Saves into the process working directory with direct writes.
    pub fn new(extractor: E, fetcher: F) -> Self {
        Self {
            extractor,
            fetcher,
            output_dir: PathBuf::from("."),
            write_mode: WriteMode::Direct,
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Downloads `url` into `<output_dir>/<extracted filename>`, overwriting
    /// any existing file, and returns the path written.
    ///
    /// The fetcher is not called when extraction fails. The fetch stream and
    /// the output file are both closed before this returns.
    pub fn download(&self, url: &str) -> Result<PathBuf, DownloadError> {
        tracing::info!(url, "downloading");
        let filename = self.extractor.extract(url)?;
        tracing::debug!(url, filename = %filename, "derived filename");

        let mut stream = self.fetcher.fetch(url)?;
        let path = self.output_dir.join(&filename);
        let written = storage::write_stream(&path, &mut stream, self.write_mode)?;
        drop(stream);

        tracing::info!(url, path = %path.display(), bytes = written, "saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use crate::url_model::{ExtractError, LastSegmentExtractor};
    use std::cell::Cell;
    use std::io::{self, Cursor, Read};
    use std::rc::Rc;

    enum Response {
        Body(&'static [u8]),
        Status(u32),
        Transport(io::ErrorKind),
        /// Sends the bytes, then the connection resets.
        Broken(&'static [u8]),
    }

    struct FakeFetcher {
        response: Response,
        calls: Cell<usize>,
        released: Rc<Cell<usize>>,
    }

    impl FakeFetcher {
        fn new(response: Response) -> Self {
            Self {
                response,
                calls: Cell::new(0),
                released: Rc::new(Cell::new(0)),
            }
        }
    }

    struct FakeStream {
        data: Cursor<Vec<u8>>,
        broken: bool,
        released: Rc<Cell<usize>>,
    }

    impl Read for FakeStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 if self.broken => Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
                n => Ok(n),
            }
        }
    }

    impl Drop for FakeStream {
        fn drop(&mut self) {
            self.released.set(self.released.get() + 1);
        }
    }

    impl ResourceFetcher for FakeFetcher {
        type Stream = FakeStream;

        fn fetch(&self, url: &str) -> Result<FakeStream, FetchError> {
            self.calls.set(self.calls.get() + 1);
            let stream = |data: &[u8], broken| FakeStream {
                data: Cursor::new(data.to_vec()),
                broken,
                released: Rc::clone(&self.released),
            };
            match &self.response {
                Response::Body(data) => Ok(stream(*data, false)),
                Response::Broken(data) => Ok(stream(*data, true)),
                Response::Status(code) => Err(FetchError::Status {
                    url: url.to_string(),
                    code: *code,
                }),
                Response::Transport(kind) => {
                    Err(FetchError::transport(io::Error::new(*kind, "Test error")))
                }
            }
        }
    }

    fn fixed_name(name: &'static str) -> impl Fn(&str) -> Result<String, ExtractError> {
        move |_| Ok(name.to_string())
    }

    const URL: &str = "http://server/path/filename.txt";

    #[test]
    fn download_writes_fetched_body() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::new(Response::Body(b"MESSAGE"));
        let released = Rc::clone(&fetcher.released);
        let dl = UrlDownloader::new(fixed_name("filename.txt"), fetcher).with_output_dir(dir.path());

        let path = dl.download(URL).unwrap();

        assert_eq!(path, dir.path().join("filename.txt"));
        assert_eq!(std::fs::read(&path).unwrap(), b"MESSAGE");
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn download_uses_extracted_name() {
        let dir = tempfile::tempdir().unwrap();
        let dl = UrlDownloader::new(LastSegmentExtractor, FakeFetcher::new(Response::Body(b"x")))
            .with_output_dir(dir.path());

        let path = dl.download("http://server/päth/filenäme.jpg?arg=1").unwrap();
        assert_eq!(path.file_name().unwrap(), "filenäme.jpg");
        assert!(path.exists());
    }

    #[test]
    fn download_server_failing() {
        let dir = tempfile::tempdir().unwrap();
        let dl = UrlDownloader::new(fixed_name("filename.txt"), FakeFetcher::new(Response::Status(500)))
            .with_output_dir(dir.path());

        let err = dl.download(URL).unwrap_err();
        match &err {
            DownloadError::Fetch(fetch) => assert_eq!(fetch.status_code(), Some(500)),
            other => panic!("expected Fetch, got {other:?}"),
        }
        assert_eq!(err.kind(), FailureKind::Status);
        assert!(!dir.path().join("filename.txt").exists());
    }

    #[test]
    fn failed_status_leaves_existing_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("filename.txt");
        std::fs::write(&target, b"old").unwrap();
        let dl = UrlDownloader::new(fixed_name("filename.txt"), FakeFetcher::new(Response::Status(404)))
            .with_output_dir(dir.path());

        assert!(dl.download(URL).is_err());
        assert_eq!(std::fs::read(&target).unwrap(), b"old");
    }

    #[test]
    fn download_transport_error_is_propagated() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::new(Response::Transport(io::ErrorKind::ConnectionRefused));
        let dl = UrlDownloader::new(fixed_name("filename.txt"), fetcher).with_output_dir(dir.path());

        let err = dl.download(URL).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
        let DownloadError::Fetch(fetch) = err else {
            panic!("expected Fetch");
        };
        let io_err = fetch
            .transport_source()
            .and_then(|e| e.downcast_ref::<io::Error>())
            .unwrap();
        assert_eq!(io_err.kind(), io::ErrorKind::ConnectionRefused);
    }

    #[test]
    fn filename_extractor_error_skips_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let failing = |_: &str| -> Result<String, ExtractError> { Err(ExtractError::Empty) };
        let dl = UrlDownloader::new(failing, FakeFetcher::new(Response::Body(b"MESSAGE")))
            .with_output_dir(dir.path());

        let err = dl.download(URL).unwrap_err();
        assert!(matches!(err, DownloadError::Extract(ExtractError::Empty)));
        assert_eq!(dl.fetcher.calls.get(), 0);
    }

    #[test]
    fn unwritable_target_is_local_io_and_releases_stream() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::new(Response::Body(b"MESSAGE"));
        let released = Rc::clone(&fetcher.released);
        let dl = UrlDownloader::new(fixed_name("filename.txt"), fetcher)
            .with_output_dir(dir.path().join("missing"));

        let err = dl.download(URL).unwrap_err();
        assert_eq!(err.kind(), FailureKind::LocalIo);
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn broken_body_leaves_partial_file_in_direct_mode() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::new(Response::Broken(b"MESS"));
        let released = Rc::clone(&fetcher.released);
        let dl = UrlDownloader::new(fixed_name("filename.txt"), fetcher).with_output_dir(dir.path());

        let err = dl.download(URL).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
        assert_eq!(std::fs::read(dir.path().join("filename.txt")).unwrap(), b"MESS");
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn broken_body_leaves_nothing_in_atomic_mode() {
        let dir = tempfile::tempdir().unwrap();
        let dl = UrlDownloader::new(fixed_name("filename.txt"), FakeFetcher::new(Response::Broken(b"MESS")))
            .with_output_dir(dir.path())
            .with_write_mode(WriteMode::Atomic);

        assert!(dl.download(URL).is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn default_output_dir_is_working_directory() {
        let dl = UrlDownloader::new(LastSegmentExtractor, FakeFetcher::new(Response::Body(b"")));
        assert_eq!(dl.output_dir(), Path::new("."));
    }
}
