//! Asynchronous asset loading.
//!
//! The frame loop runs on a sync thread and must never wait on IO, so the
//! loader owns a dedicated thread with its own tokio runtime: one task per
//! asset, each result sent back over a crossbeam channel the frame loop
//! drains at the top of every tick. Aggregate progress lives behind a lock
//! so it can be read between polls.
//!
//! Failures are non-fatal by design: a failed asset is logged, counted as
//! settled, and the feature it backs simply stays absent.

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tokio::runtime::Runtime;

/// What an asset resolves into, which also decides how it is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// glTF model; animation clip metadata is extracted on load
    Model,
    /// Scene texture decoded for dimensions
    Texture,
    /// HDR environment, kept as opaque bytes for the renderer
    Environment,
    /// Audio buffer, kept as opaque bytes for the frontend
    Audio,
    /// Preloaded UI card image, tracked separately from engine assets
    UiImage,
}

impl AssetKind {
    fn is_ui(self) -> bool {
        matches!(self, Self::UiImage)
    }
}

#[derive(Debug, Clone)]
pub struct AssetRequest {
    pub id: String,
    pub kind: AssetKind,
    pub path: PathBuf,
}

/// Animation clip metadata pulled from a model's glTF document
#[derive(Debug, Clone)]
pub struct ClipInfo {
    pub name: String,
    /// Clip duration in seconds (maximum keyframe time across channels)
    pub length: f32,
}

#[derive(Debug, Clone)]
pub struct ModelData {
    pub clips: Vec<ClipInfo>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum AssetPayload {
    Model(ModelData),
    Texture(TextureData),
    Environment(Vec<u8>),
    Audio(Vec<u8>),
    UiImage(TextureData),
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode asset {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("asset loader runtime unavailable: {message}")]
    Runtime { message: String },
}

/// One settled load, success or failure
pub struct LoadedAsset {
    pub id: String,
    pub kind: AssetKind,
    pub payload: Result<AssetPayload, AssetError>,
}

#[derive(Debug, Default, Clone, Copy)]
struct LoadCounts {
    engine_total: usize,
    engine_settled: usize,
    ui_total: usize,
    ui_settled: usize,
}

impl LoadCounts {
    fn settle(&mut self, kind: AssetKind) {
        if kind.is_ui() {
            self.ui_settled += 1;
        } else {
            self.engine_settled += 1;
        }
    }
}

pub struct AssetLoader {
    events: Receiver<LoadedAsset>,
    counts: Arc<Mutex<LoadCounts>>,
}

impl AssetLoader {
    /// Spawns the loader thread and begins resolving every request
    pub fn spawn(requests: Vec<AssetRequest>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();

        let mut initial = LoadCounts::default();
        for request in &requests {
            if request.kind.is_ui() {
                initial.ui_total += 1;
            } else {
                initial.engine_total += 1;
            }
        }
        let counts = Arc::new(Mutex::new(initial));

        if !requests.is_empty() {
            let thread_counts = Arc::clone(&counts);
            thread::spawn(move || run_loader(requests, tx, thread_counts));
        }

        Self { events: rx, counts }
    }

    /// Drains settled loads without blocking
    pub fn poll(&self) -> Vec<LoadedAsset> {
        self.events.try_iter().collect()
    }

    /// Settled fraction across the engine and UI sets; 1.0 when nothing
    /// was requested
    pub fn progress(&self) -> f32 {
        let counts = self.counts.lock();
        let total = counts.engine_total + counts.ui_total;
        if total == 0 {
            return 1.0;
        }
        (counts.engine_settled + counts.ui_settled) as f32 / total as f32
    }

    pub fn is_complete(&self) -> bool {
        let counts = self.counts.lock();
        counts.engine_settled >= counts.engine_total && counts.ui_settled >= counts.ui_total
    }
}

fn run_loader(requests: Vec<AssetRequest>, tx: Sender<LoadedAsset>, counts: Arc<Mutex<LoadCounts>>) {
    let runtime = match Runtime::new() {
        Ok(runtime) => runtime,
        Err(source) => {
            tracing::error!(error = %source, "asset loader runtime failed to start");
            // Settle everything with an error so loading can still complete
            let message = source.to_string();
            for request in requests {
                let kind = request.kind;
                let _ = tx.send(LoadedAsset {
                    id: request.id,
                    kind,
                    payload: Err(AssetError::Runtime {
                        message: message.clone(),
                    }),
                });
                counts.lock().settle(kind);
            }
            return;
        }
    };

    runtime.block_on(async move {
        let mut handles = Vec::new();
        for request in requests {
            let tx = tx.clone();
            let counts = Arc::clone(&counts);
            handles.push(tokio::spawn(async move {
                let payload = load_asset(&request).await;
                if let Err(error) = &payload {
                    tracing::warn!(id = %request.id, error = %error, "asset load failed");
                }
                // Send before settling so a completed count always means
                // the event is already in the channel
                let kind = request.kind;
                let _ = tx.send(LoadedAsset {
                    id: request.id,
                    kind,
                    payload,
                });
                counts.lock().settle(kind);
            }));
        }
        for handle in handles {
            let _ = handle.await;
        }
    });
}

async fn load_asset(request: &AssetRequest) -> Result<AssetPayload, AssetError> {
    let bytes = tokio::fs::read(&request.path)
        .await
        .map_err(|source| AssetError::Io {
            path: request.path.clone(),
            source,
        })?;

    match request.kind {
        AssetKind::Model => decode_model(&request.path, bytes),
        AssetKind::Texture => decode_image(&request.path, bytes).map(AssetPayload::Texture),
        AssetKind::UiImage => decode_image(&request.path, bytes).map(AssetPayload::UiImage),
        AssetKind::Environment => Ok(AssetPayload::Environment(bytes)),
        AssetKind::Audio => Ok(AssetPayload::Audio(bytes)),
    }
}

/// Parses a glTF/GLB document and extracts animation clip metadata. The
/// bytes are kept for the renderer's own import pipeline.
fn decode_model(path: &Path, bytes: Vec<u8>) -> Result<AssetPayload, AssetError> {
    let (document, _buffers, _images) =
        gltf::import_slice(&bytes).map_err(|error| AssetError::Decode {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;

    let clips = document
        .animations()
        .map(|animation| {
            // Clip length is the largest keyframe time of any channel input
            let length = animation
                .channels()
                .filter_map(|channel| channel.sampler().input().max())
                .filter_map(|max| {
                    max.as_array()
                        .and_then(|values| values.first())
                        .and_then(|value| value.as_f64())
                })
                .fold(0.0f32, |acc, t| acc.max(t as f32));
            ClipInfo {
                name: animation.name().unwrap_or("clip").to_string(),
                length,
            }
        })
        .collect();

    Ok(AssetPayload::Model(ModelData { clips, bytes }))
}

fn decode_image(path: &Path, bytes: Vec<u8>) -> Result<TextureData, AssetError> {
    let decoded = image::load_from_memory(&bytes).map_err(|error| AssetError::Decode {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;
    Ok(TextureData {
        width: decoded.width(),
        height: decoded.height(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    fn wait_complete(loader: &AssetLoader) -> Vec<LoadedAsset> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut settled = Vec::new();
        while !loader.is_complete() {
            assert!(Instant::now() < deadline, "loader did not settle in time");
            settled.extend(loader.poll());
            thread::sleep(Duration::from_millis(5));
        }
        settled.extend(loader.poll());
        settled
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::new(4, 2));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_empty_manifest_is_complete_immediately() {
        let loader = AssetLoader::spawn(Vec::new());
        assert!(loader.is_complete());
        assert!((loader.progress() - 1.0).abs() < f32::EPSILON);
        assert!(loader.poll().is_empty());
    }

    #[test]
    fn test_loads_settle_with_mixed_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let png_path = dir.path().join("card.png");
        std::fs::write(&png_path, png_bytes()).unwrap();
        let broken_model = dir.path().join("broken.glb");
        std::fs::write(&broken_model, b"not a model").unwrap();
        let audio_path = dir.path().join("music.mp3");
        std::fs::write(&audio_path, b"opaque audio bytes").unwrap();

        let loader = AssetLoader::spawn(vec![
            AssetRequest {
                id: "ui/card".into(),
                kind: AssetKind::UiImage,
                path: png_path,
            },
            AssetRequest {
                id: "character/model".into(),
                kind: AssetKind::Model,
                path: broken_model,
            },
            AssetRequest {
                id: "audio/music".into(),
                kind: AssetKind::Audio,
                path: audio_path,
            },
            AssetRequest {
                id: "missing".into(),
                kind: AssetKind::Texture,
                path: dir.path().join("does_not_exist.jpg"),
            },
        ]);

        let settled = wait_complete(&loader);
        assert_eq!(settled.len(), 4);
        assert!((loader.progress() - 1.0).abs() < f32::EPSILON);

        for loaded in settled {
            match loaded.id.as_str() {
                "ui/card" => match loaded.payload {
                    Ok(AssetPayload::UiImage(texture)) => {
                        assert_eq!((texture.width, texture.height), (4, 2));
                    }
                    other => panic!("unexpected card payload: {:?}", other.is_ok()),
                },
                // Corrupt model: failure is terminal for this asset only
                "character/model" => assert!(loaded.payload.is_err()),
                "audio/music" => match loaded.payload {
                    Ok(AssetPayload::Audio(bytes)) => {
                        assert_eq!(bytes, b"opaque audio bytes");
                    }
                    other => panic!("unexpected audio payload: {:?}", other.is_ok()),
                },
                "missing" => match loaded.payload {
                    Err(AssetError::Io { .. }) => {}
                    _ => panic!("expected an io error for the missing file"),
                },
                other => panic!("unexpected asset id {other}"),
            }
        }
    }

    #[test]
    fn test_progress_counts_both_sets() {
        let dir = tempfile::tempdir().unwrap();
        let png_path = dir.path().join("only.png");
        std::fs::write(&png_path, png_bytes()).unwrap();

        let loader = AssetLoader::spawn(vec![
            AssetRequest {
                id: "ui/only".into(),
                kind: AssetKind::UiImage,
                path: png_path.clone(),
            },
            AssetRequest {
                id: "texture/only".into(),
                kind: AssetKind::Texture,
                path: png_path,
            },
        ]);

        wait_complete(&loader);
        let counts = loader.counts.lock();
        assert_eq!(counts.ui_total, 1);
        assert_eq!(counts.engine_total, 1);
        assert_eq!(counts.ui_settled, 1);
        assert_eq!(counts.engine_settled, 1);
    }
}
