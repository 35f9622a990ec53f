//! Tessera demo: a tiny retained widget tree drawn through `Renderer`.
//!
//! `tessera-demo` opens a window; `tessera-demo --headless` renders one frame
//! into the recording backend and logs batch statistics.
//! `TESSERA_SAMPLES` sets the rounded-corner sample count (default 4).

mod app;
mod headless;
mod widgets;

use anyhow::Result;
use tessera_engine::logging::{init_logging, LoggingConfig};
use tessera_engine::text::{FontSystem, TextFont};

const DEFAULT_SAMPLES: u32 = 4;

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
];

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub headless: bool,
    /// Arc samples per rounded corner.
    pub samples: u32,
    /// Logical window size.
    pub size: (f32, f32),
}

impl DemoConfig {
    fn from_env() -> Self {
        let headless = std::env::args().skip(1).any(|a| a == "--headless");
        let samples = match std::env::var("TESSERA_SAMPLES") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("TESSERA_SAMPLES={raw:?} is not a sample count; using {DEFAULT_SAMPLES}");
                DEFAULT_SAMPLES
            }),
            Err(_) => DEFAULT_SAMPLES,
        };
        Self { headless, samples, size: (960.0, 640.0) }
    }
}

/// Loads the first available system font. Text is skipped without one.
pub fn load_fonts() -> (FontSystem, Option<TextFont>) {
    let mut fonts = FontSystem::new();
    let font = match fonts.load_first_font(FONT_CANDIDATES) {
        Ok(id) => Some(TextFont::new(id, 16.0)),
        Err(e) => {
            log::warn!("no font loaded ({e}); labels will not be drawn");
            None
        }
    };
    (fonts, font)
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = DemoConfig::from_env();
    log::info!("tessera demo: {config:?}");

    if config.headless {
        headless::run(&config)
    } else {
        app::run(config)
    }
}
