use std::io::{Cursor, Write};
use std::sync::Arc;
use std::time::Duration;

use racefetch_core::BufferLogger;
use racefetch_fetch::{CancellationToken, Error, FetchOptions, Fetcher, ReqwestClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn payload() -> Vec<u8> {
    // Poorly compressible so the gzip body spans several reads.
    let mut state = 0x2545_f491_u32;
    (0..20000)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

/// Compressed input is pulled through the download tracker in blocks of
/// this size.
const GZIP_BLOCK: usize = 4096;

fn tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, data) in entries {
        if let Some((dir, _)) = name.split_once('/') {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
            header.set_mode(0o755);
            builder.append_data(&mut header, dir, std::io::empty()).unwrap();
        }
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, name, *data).unwrap();
    }
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&builder.into_inner().unwrap()).unwrap();
    encoder.finish().unwrap()
}

fn zip_bundle() -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    writer.add_directory("to/", options).unwrap();
    writer.start_file("to/file.txt", options).unwrap();
    writer.write_all(&payload()).unwrap();
    writer.start_file("to/file2.txt", options).unwrap();
    writer.write_all(b"ok").unwrap();
    writer.finish().unwrap().into_inner()
}

async fn serve(server: &MockServer, at: &str, body: Vec<u8>, delay: Option<Duration>) {
    let mut response = ResponseTemplate::new(200).set_body_bytes(body);
    if let Some(delay) = delay {
        response = response.set_delay(delay);
    }
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(response)
        .mount(server)
        .await;
}

fn fetcher(options: FetchOptions) -> Fetcher<ReqwestClient> {
    Fetcher::new(ReqwestClient::new().unwrap(), options)
}

fn percent(line: &str) -> u64 {
    line.trim_start_matches("Progress: ")
        .trim_end_matches('%')
        .parse()
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn tar_gz_with_throttled_progress() {
    let server = MockServer::start().await;
    let body = tar_gz(&[("a/t.txt", &payload())]);
    let first_sample = format!("Progress: {:02}%", GZIP_BLOCK * 100 / body.len());
    serve(&server, "/t.tar.gz", body, None).await;
    let url = format!("{}/t.tar.gz", server.uri());

    let dir = tempfile::tempdir().unwrap();
    let logger = BufferLogger::new();
    let options = FetchOptions::new([url.clone()])
        .save_to(dir.path())
        .logger(Arc::new(logger.clone()))
        .min_report_span(Duration::from_secs(1));

    fetcher(options).fetch().await.unwrap();

    assert_eq!(
        logger.lines(),
        vec![
            format!("Download: {url}"),
            first_sample,
            "Progress: 100%".to_string(),
            format!("Downloaded: {}", dir.path().display()),
        ]
    );

    let extracted = std::fs::read(dir.path().join("a").join("t.txt")).unwrap();
    assert_eq!(extracted, payload());
}

#[tokio::test(flavor = "multi_thread")]
async fn zip_reports_both_phases() {
    let server = MockServer::start().await;
    serve(&server, "/t.zip", zip_bundle(), None).await;
    let url = format!("{}/t.zip", server.uri());

    let dir = tempfile::tempdir().unwrap();
    let logger = BufferLogger::new();
    let options = FetchOptions::new([url.clone()])
        .save_to(dir.path())
        .logger(Arc::new(logger.clone()))
        .min_report_span(Duration::ZERO);

    fetcher(options).fetch().await.unwrap();

    let lines = logger.lines();
    let unzip = format!("Unzip: {}", dir.path().display());
    let split = lines.iter().position(|l| *l == unzip).expect("unzip line");

    assert_eq!(lines[0], format!("Download: {url}"));
    assert_eq!(lines.last().unwrap(), &format!("Downloaded: {}", dir.path().display()));

    let download = &lines[1..split];
    assert!(!download.is_empty());
    assert!(download.iter().all(|l| l.starts_with("Progress: ")), "{lines:?}");
    assert!(download.windows(2).all(|w| percent(&w[0]) <= percent(&w[1])));
    assert_eq!(download.last().unwrap(), "Progress: 100%");

    let unzip_lines = &lines[split + 1..lines.len() - 1];
    assert!(!unzip_lines.is_empty());
    assert!(unzip_lines.iter().all(|l| !l.starts_with("Progress") && l.ends_with('%')));
    assert!(unzip_lines.windows(2).all(|w| percent(&w[0]) <= percent(&w[1])));
    assert_eq!(unzip_lines.last().unwrap(), "100%");

    assert_eq!(std::fs::read(dir.path().join("to/file.txt")).unwrap(), payload());
    assert_eq!(std::fs::read(dir.path().join("to/file2.txt")).unwrap(), b"ok");
}

#[tokio::test(flavor = "multi_thread")]
async fn race_prefers_the_fast_mirror() {
    let server = MockServer::start().await;
    let body = tar_gz(&[("a/t.txt", b"hello")]);
    serve(&server, "/slow/t.tar.gz", body.clone(), Some(Duration::from_secs(3))).await;
    serve(&server, "/fast/t.tar.gz", body, None).await;

    let slow = format!("{}/slow/t.tar.gz", server.uri());
    let fast = format!("{}/fast/t.tar.gz", server.uri());
    let options = FetchOptions::new([slow, fast.clone()]).probe_size(16);

    let started = std::time::Instant::now();
    let winner = fetcher(options).fastest_url().await;

    assert_eq!(winner, Some(fast));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test(flavor = "multi_thread")]
async fn race_skips_failing_mirrors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing/t.tar.gz"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    serve(&server, "/ok/t.tar.gz", tar_gz(&[("a/t.txt", b"hello")]), None).await;

    let ok = format!("{}/ok/t.tar.gz", server.uri());
    let options = FetchOptions::new([
        format!("{}/missing/t.tar.gz", server.uri()),
        "http://127.0.0.1:9/t.tar.gz".to_string(),
        ok.clone(),
    ]);

    assert_eq!(fetcher(options).fastest_url().await, Some(ok));
}

#[tokio::test(flavor = "multi_thread")]
async fn all_candidates_failing_is_no_valid_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let urls = vec![
        format!("{}/a/t.tar.gz", server.uri()),
        format!("{}/b/t.tar.gz", server.uri()),
    ];
    let dir = tempfile::tempdir().unwrap();
    let options = FetchOptions::new(urls.clone()).save_to(dir.path().join("out"));

    let result = fetcher(options).fetch().await;

    assert!(matches!(result, Err(Error::NoValidUrl { urls: ref got }) if *got == urls));
    assert!(!dir.path().join("out").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_candidate_list_is_no_valid_url() {
    let options = FetchOptions::new(Vec::<String>::new());
    let result = fetcher(options).fetch().await;
    assert!(matches!(result, Err(Error::NoValidUrl { urls }) if urls.is_empty()));
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelled_before_start_does_nothing() {
    let server = MockServer::start().await;
    serve(&server, "/t.tar.gz", tar_gz(&[("a/t.txt", b"hello")]), None).await;

    let token = CancellationToken::new();
    token.cancel();
    let dir = tempfile::tempdir().unwrap();
    let logger = BufferLogger::new();
    let options = FetchOptions::new([format!("{}/t.tar.gz", server.uri())])
        .save_to(dir.path().join("out"))
        .logger(Arc::new(logger.clone()))
        .cancel(token);

    let result = fetcher(options).fetch().await;

    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(!dir.path().join("out").exists());
    assert!(logger.lines().is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelled_during_race() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/t.tar.gz",
        tar_gz(&[("a/t.txt", b"hello")]),
        Some(Duration::from_secs(10)),
    )
    .await;

    let token = CancellationToken::new();
    let options = FetchOptions::new([format!("{}/t.tar.gz", server.uri())]).cancel(token.clone());
    let fetcher = fetcher(options);

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(5), fetcher.fetch())
        .await
        .expect("cancellation should end the race");
    canceller.await.unwrap();

    assert!(matches!(result, Err(Error::Cancelled)));
}

#[tokio::test(flavor = "multi_thread")]
async fn download_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let url = format!("{}/t.tar.gz", server.uri());

    let dir = tempfile::tempdir().unwrap();
    let options = FetchOptions::default().save_to(dir.path());
    let result = fetcher(options).download(&url).await;

    assert!(matches!(result, Err(Error::Status { status: 503, .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn corrupt_gzip_is_a_decode_error() {
    let server = MockServer::start().await;
    serve(&server, "/t.tar.gz", b"this is not gzip".to_vec(), None).await;
    let url = format!("{}/t.tar.gz", server.uri());

    let dir = tempfile::tempdir().unwrap();
    let options = FetchOptions::default().save_to(dir.path());
    let result = fetcher(options).download(&url).await;

    assert!(matches!(result, Err(Error::Decode(_))), "{result:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn zip_slip_is_an_archive_error() {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("../escape.txt", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"x").unwrap();
    let body = writer.finish().unwrap().into_inner();

    let server = MockServer::start().await;
    serve(&server, "/t.zip", body, None).await;
    let url = format!("{}/t.zip", server.uri());

    let root = tempfile::tempdir().unwrap();
    let options = FetchOptions::default().save_to(root.path().join("out"));
    let result = fetcher(options).download(&url).await;

    assert!(
        matches!(result, Err(Error::Archive(racefetch_archive::Error::ZipSlip { .. }))),
        "{result:?}"
    );
    assert!(!root.path().join("escape.txt").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn plain_file_is_saved_under_its_name() {
    let server = MockServer::start().await;
    serve(&server, "/dl/notes.txt", b"just text".to_vec(), None).await;
    let url = format!("{}/dl/notes.txt?sig=abc", server.uri());

    let dir = tempfile::tempdir().unwrap();
    let options = FetchOptions::default().save_to(dir.path());
    fetcher(options).download(&url).await.unwrap();

    assert_eq!(std::fs::read(dir.path().join("notes.txt")).unwrap(), b"just text");
}
