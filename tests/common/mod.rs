#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const EXTRACT_PATH: &str = "/south-america/chile-latest.osm.pbf";
pub const POLY_PATH: &str = "/get_poly.py";
pub const SQUARE_POLY: &str = "santiago\n1\n-71 -34\n-70 -34\n-70 -33\n-71 -33\nEND\nEND\n";
pub const EXTRACT_BODY: &[u8] = b"node 1 -70.6 -33.4\nnode 2 -72.0 -33.4\n";

type Routes = HashMap<String, (u16, Vec<u8>)>;

/// Minimal HTTP/1.1 server answering fixed bodies per path and counting hits.
pub struct StubServer {
    pub base: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl StubServer {
    pub fn start(routes: &[(&str, u16, &[u8])]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let base = format!("http://{}", listener.local_addr().expect("local addr"));
        let routes: Routes = routes
            .iter()
            .map(|(p, s, b)| (p.to_string(), (*s, b.to_vec())))
            .collect();
        let hits = Arc::new(Mutex::new(HashMap::new()));
        let counter = Arc::clone(&hits);
        std::thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                serve(stream, &routes, &counter);
            }
        });
        Self { base, hits }
    }

    pub fn hits(&self, path: &str) -> usize {
        self.hits
            .lock()
            .expect("hits lock")
            .get(path)
            .copied()
            .unwrap_or(0)
    }
}

fn serve(mut stream: TcpStream, routes: &Routes, hits: &Mutex<HashMap<String, usize>>) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) | Err(_) => break,
            Ok(_) if header == "\r\n" || header == "\n" => break,
            Ok(_) => {}
        }
    }
    let target = request_line.split_whitespace().nth(1).unwrap_or("/");
    let path = target.split('?').next().unwrap_or("/").to_string();
    *hits.lock().expect("hits lock").entry(path.clone()).or_default() += 1;

    let (status, body) = routes
        .get(&path)
        .cloned()
        .unwrap_or((404, b"not found".to_vec()));
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };
    let head = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&body);
    let _ = stream.flush();
}

pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
    pub config: PathBuf,
}

impl TestEnv {
    /// Workspace with `data/external` present, a config pointing at `server`
    /// and a stand-in clipper that copies its input.
    pub fn new(server: &StubServer) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        fs::create_dir_all(root.join("data/external")).expect("create data dir");
        let clipper = write_fake_clipper(&root);

        let config = root.join("zorzim-data.json");
        let body = serde_json::json!({
            "data_dir": "data/external",
            "extract": {
                "url": format!("{}{}", server.base, EXTRACT_PATH),
                "filename": "chile-latest.osm.pbf"
            },
            "polygon_service": format!("{}{}", server.base, POLY_PATH),
            "clipper": { "program": clipper.to_str().expect("utf8 path") },
            "timeouts": { "connect_secs": 5, "extract_secs": 10, "boundary_secs": 10 }
        });
        fs::write(&config, serde_json::to_string_pretty(&body).expect("serialize"))
            .expect("write config");

        Self {
            _tmp: tmp,
            root,
            config,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("zorzim-data");
        cmd.current_dir(&self.root)
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(&self.config);
        for var in [
            "HTTP_PROXY",
            "HTTPS_PROXY",
            "ALL_PROXY",
            "http_proxy",
            "https_proxy",
            "all_proxy",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn osm_dir(&self) -> PathBuf {
        self.root.join("data/external/OSM")
    }

    pub fn osm_files(&self) -> Vec<String> {
        let mut names: Vec<String> = match fs::read_dir(self.osm_dir()) {
            Ok(rd) => rd
                .map(|e| e.expect("dir entry").file_name().to_string_lossy().to_string())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }
}

#[cfg(unix)]
fn write_fake_clipper(root: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = root.join("fake-osmconvert");
    let script = r#"#!/bin/sh
input=""
poly=""
out=""
for arg in "$@"; do
  case "$arg" in
    -B=*) poly="${arg#-B=}" ;;
    -o=*) out="${arg#-o=}" ;;
    -h) exit 0 ;;
    -*) ;;
    *) input="$arg" ;;
  esac
done
[ -s "$poly" ] || { echo "osmconvert Error: no border polygon" >&2; exit 1; }
cp "$input" "$out"
"#;
    fs::write(&path, script).expect("write fake clipper");
    let mut perms = fs::metadata(&path).expect("clipper metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod fake clipper");
    path
}

#[cfg(not(unix))]
fn write_fake_clipper(root: &Path) -> PathBuf {
    root.join("fake-osmconvert")
}
