//! A small CLI front-end for the `webserver` library, demonstrating
//! registration, routing, and body streaming end to end over a real socket.
//!
//! Relocated from the teacher's `src/main.rs`
//! (`examples/jackwickham-rust-webserver/src/main.rs`) now that the crate is
//! a library with its own binary entry point; this is the only place that
//! installs a concrete logger (`env_logger`), matching the crate's
//! logging-facade-only design (see DESIGN.md).

use std::io::BufRead;
use std::thread;

use webserver::http::BodyProgress;
use webserver::{Request, Response, Server};

fn main() {
    env_logger::init();

    let addr = std::env::args().nth(1).unwrap_or_else(|| "127.0.0.1:8080".to_string());
    let mut server = match Server::new(&addr) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    server.register("/", handle_root);
    server.register("/echo", handle_echo);
    server.register("/users/*/posts/*", handle_user_post);

    spawn_stdin_shutdown(server.shutdown_handle());

    println!("listening on {} (press enter to stop)", addr);
    if let Err(e) = server.run() {
        eprintln!("server loop ended with an error: {}", e);
    }
}

fn handle_root(response: &mut Response, _request: &mut Request) {
    let body = b"<h1>webserver</h1>";
    response.set_content_length(body.len() as u64);
    if let Err(e) = response.send(200) {
        log::warn!("failed to send response: {}", e);
        return;
    }
    if let Err(e) = response.write_body_chunk(body) {
        log::warn!("failed to write body: {}", e);
    }
}

fn handle_echo(response: &mut Response, request: &mut Request) {
    response.set_content_length(request.content_length());
    if let Err(e) = response.send(200) {
        log::warn!("failed to send response: {}", e);
        return;
    }

    let mut chunk = [0u8; 256];
    loop {
        match request.read_body_chunk(&mut chunk) {
            Ok(BodyProgress::Continuing(n)) => {
                if let Err(e) = response.write_body_chunk(&chunk[..n]) {
                    log::warn!("failed to stream body chunk: {}", e);
                    return;
                }
            }
            Ok(BodyProgress::Done) => break,
            Err(e) => {
                log::warn!("failed to read request body: {}", e);
                break;
            }
        }
    }
}

fn handle_user_post(response: &mut Response, request: &mut Request) {
    let user = request.pathvar(0);
    let post = request.pathvar(1);
    let body = format!(
        "user={:?} post={:?}",
        user.segments.iter().map(|s| s.value.as_str()).collect::<Vec<_>>(),
        post.segments.iter().map(|s| s.value.as_str()).collect::<Vec<_>>(),
    );
    response.set_content_length(body.len() as u64);
    if let Err(e) = response.send(200) {
        log::warn!("failed to send response: {}", e);
        return;
    }
    if let Err(e) = response.write_body_chunk(body.as_bytes()) {
        log::warn!("failed to write body: {}", e);
    }
}

/// Lets a developer stop the demo by pressing enter, standing in for the
/// `ctrlc`-style signal handler described in SPEC_FULL.md §5 — this crate
/// deliberately doesn't bundle a signal-handling dependency (see DESIGN.md),
/// so embedders wire their own trigger to `Server::shutdown_handle`.
fn spawn_stdin_shutdown(should_run: std::sync::Arc<std::sync::atomic::AtomicBool>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        let _ = stdin.lock().read_line(&mut line);
        should_run.store(false, std::sync::atomic::Ordering::SeqCst);
    });
}
