use std::io;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::prelude::*;

/// Buffers a single formatted event and writes it to the browser console on
/// flush or drop.
#[derive(Debug, Default)]
pub struct ConsoleWriter {
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }

        let s = String::from_utf8_lossy(&self.buf);
        web_sys::console::log_1(&JsValue::from_str(s.trim_end()));
        self.buf.clear();

        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::default()
    }
}

/// Send tracing output to the browser console.
///
/// `verbose` follows the cli convention, 0 is info, 1 is debug, anything more
/// is trace.
#[wasm_bindgen]
pub fn init_console_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_writer(MakeConsoleWriter)
        .with_max_level(level)
        .with_ansi(false)
        // No system clock on wasm32-unknown-unknown.
        .without_time()
        .finish();

    // Only fails if already set.
    let _ = tracing::subscriber::set_global_default(subscriber);
}
