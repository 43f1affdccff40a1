//! Route `tracing` output to the browser console

use std::io;
use std::sync::Once;
use tracing_subscriber::fmt::MakeWriter;

static INIT: Once = Once::new();

/// Install the console subscriber once per page
pub fn init() {
    INIT.call_once(|| {
        let result = tracing_subscriber::fmt()
            .with_writer(ConsoleMakeWriter)
            .without_time()
            .with_ansi(false)
            .with_target(false)
            .with_max_level(tracing::Level::INFO)
            .try_init();
        if let Err(e) = result {
            web_sys::console::warn_1(&format!("tracing already initialized: {}", e).into());
        }
    });
}

struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter(Vec::new())
    }
}

/// Buffers one formatted event and logs it on drop
struct ConsoleWriter(Vec<u8>);

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.0.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.0);
        web_sys::console::log_1(&line.trim_end().into());
    }
}
