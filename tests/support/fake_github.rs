//! One-response-per-connection HTTP server standing in for GitHub.
//!
//! Shared by the in-crate workflow tests and the binary-level integration
//! tests.

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

pub const FEED_PATH: &str = "/repos/GloriousEggroll/proton-ge-custom/releases/latest";

type Routes = Arc<Mutex<HashMap<String, (u16, Vec<u8>)>>>;

pub struct FakeGitHub {
    pub base_url: String,
    routes: Routes,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeGitHub {
    /// A server that answers 404 to everything until routes are added.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind test server");
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let routes: Routes = Arc::new(Mutex::new(HashMap::new()));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let served = Arc::clone(&routes);
        let seen = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let path = read_request_path(&mut stream);
                seen.lock().unwrap().push(path.clone());

                let (status, body) = served
                    .lock()
                    .unwrap()
                    .get(&path)
                    .cloned()
                    .unwrap_or((404, b"{\"message\":\"Not Found\"}".to_vec()));
                let head = format!(
                    "HTTP/1.1 {} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(&body);
            }
        });

        Self {
            base_url,
            routes,
            requests,
        }
    }

    /// Publish `tag` as the latest release, with a gzip tarball asset whose
    /// top-level directory is the tag itself.
    pub fn with_release(self, tag: &str) -> Self {
        self.with_release_unpacking_to(tag, tag)
    }

    /// Like `with_release`, but the tarball unpacks into `top_dir`.
    pub fn with_release_unpacking_to(self, tag: &str, top_dir: &str) -> Self {
        let server = self.with_feed(tag);
        server.route(&format!("/download/{}.tar.gz", tag), 200, tar_gz(top_dir));
        server
    }

    /// Publish the feed for `tag` without serving its assets.
    pub fn with_feed(self, tag: &str) -> Self {
        let feed = serde_json::json!({
            "tag_name": tag,
            "assets": [
                {
                    "name": format!("{}.sha512sum", tag),
                    "browser_download_url": format!("{}/download/{}.sha512sum", self.base_url, tag)
                },
                {
                    "name": format!("{}.tar.gz", tag),
                    "browser_download_url": format!("{}/download/{}.tar.gz", self.base_url, tag)
                }
            ]
        });
        self.route(FEED_PATH, 200, feed.to_string().into_bytes());
        self
    }

    fn route(&self, path: &str, status: u16, body: Vec<u8>) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body));
    }

    pub fn requested(&self, path: &str) -> bool {
        self.requests.lock().unwrap().iter().any(|p| p == path)
    }
}

fn read_request_path<R: Read>(stream: &mut R) -> String {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    while !buf.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte) {
            Ok(1) => buf.push(byte[0]),
            _ => break,
        }
    }
    String::from_utf8_lossy(&buf)
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string()
}

/// A gzip tarball holding `<top_dir>/version`, whose content is the name.
pub fn tar_gz(top_dir: &str) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::fast()));
    let body = format!("{}\n", top_dir);
    let mut header = tar::Header::new_gnu();
    header.set_size(body.len() as u64);
    header.set_mode(0o644);
    builder
        .append_data(&mut header, format!("{}/version", top_dir), body.as_bytes())
        .expect("Failed to build tarball");
    builder.into_inner().unwrap().finish().unwrap()
}
