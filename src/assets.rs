//! Background asset loading.
//!
//! The environment map and the text font are read and decoded off the event
//! loop thread. Results come back over a channel that the app polls once per
//! frame; a failed load is logged and the feature simply stays absent.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use log::*;

use crate::environment::EnvironmentMap;
use crate::error::AssetError;
use crate::geometry::MeshData;
use crate::text::{self, TextConfig};

/// A finished load.
#[derive(Debug)]
pub enum LoadedAsset {
    Environment(EnvironmentMap),
    Text(MeshData),
}

/// What a pending load was for, used in log messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Environment,
    Text,
}

type LoadResult = (AssetKind, PathBuf, Result<LoadedAsset, AssetError>);

/// Spawns loader threads and collects their results.
pub struct AssetLoader {
    root: PathBuf,
    tx: Sender<LoadResult>,
    rx: Receiver<LoadResult>,
    pending: usize,
}

impl AssetLoader {
    /// Paths passed to the `load_*` methods are resolved against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            root: root.into(),
            tx,
            rx,
            pending: 0,
        }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Loads still in flight.
    #[cfg(test)]
    fn pending(&self) -> usize {
        self.pending
    }

    /// Start decoding an environment map no larger than `max_dimension`.
    pub fn load_environment(&mut self, path: &Path, max_dimension: u32) {
        let path = self.resolve(path);
        self.spawn(AssetKind::Environment, path, move |p| {
            EnvironmentMap::load(p, max_dimension).map(LoadedAsset::Environment)
        });
    }

    /// Start building the text mesh for `config`.
    pub fn load_text(&mut self, config: &TextConfig) {
        let path = self.resolve(&config.font);
        let config = config.clone();
        self.spawn(AssetKind::Text, path, move |p| {
            text::load_text_mesh(p, &config).map(LoadedAsset::Text)
        });
    }

    fn spawn<F>(&mut self, kind: AssetKind, path: PathBuf, load: F)
    where
        F: FnOnce(&Path) -> Result<LoadedAsset, AssetError> + Send + 'static,
    {
        debug!("Loading {kind:?} from {}", path.display());
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("load-{kind:?}").to_lowercase())
            .spawn(move || {
                let result = load(&path);
                // The app may already be gone; nothing to report to then.
                let _ = tx.send((kind, path, result));
            });

        match spawned {
            Ok(_) => self.pending += 1,
            Err(e) => warn!("Couldn't start {kind:?} loader thread: {e}"),
        }
    }

    /// Collect every load that has finished since the last call.
    ///
    /// Failures are logged as warnings and not returned.
    pub fn poll(&mut self) -> Vec<LoadedAsset> {
        let mut done = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok((kind, path, result)) => {
                    self.pending = self.pending.saturating_sub(1);
                    match result {
                        Ok(asset) => {
                            info!("Loaded {kind:?} from {}", path.display());
                            done.push(asset);
                        }
                        Err(e) => warn!("{kind:?} unavailable, continuing without it: {e}"),
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        done
    }

    /// Block until every pending load has finished.
    #[cfg(test)]
    fn wait_all(&mut self) -> Vec<LoadedAsset> {
        let mut done = Vec::new();
        while self.pending > 0 {
            match self.rx.recv() {
                Ok((kind, path, result)) => {
                    self.pending -= 1;
                    match result {
                        Ok(asset) => done.push(asset),
                        Err(e) => warn!("{kind:?} from {} failed: {e}", path.display()),
                    }
                }
                Err(_) => break,
            }
        }
        done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_environment_is_skipped() {
        let mut loader = AssetLoader::new("definitely/not/a/dir");
        loader.load_environment(Path::new("sky.hdr"), 1024);
        assert_eq!(loader.pending(), 1);
        let loaded = loader.wait_all();
        assert!(loaded.is_empty());
        assert_eq!(loader.pending(), 0);
    }

    #[test]
    fn test_missing_font_is_skipped() {
        let mut loader = AssetLoader::new("definitely/not/a/dir");
        loader.load_text(&TextConfig::default());
        assert!(loader.wait_all().is_empty());
    }

    #[test]
    fn test_environment_loads_from_root() {
        let dir = std::env::temp_dir().join(format!("raindrops-assets-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        image::RgbImage::from_pixel(4, 2, image::Rgb([10, 20, 30]))
            .save(dir.join("sky.png"))
            .unwrap();

        let mut loader = AssetLoader::new(&dir);
        loader.load_environment(Path::new("sky.png"), 1024);
        let loaded = loader.wait_all();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(loaded.len(), 1);
        match &loaded[0] {
            LoadedAsset::Environment(map) => assert_eq!((map.width, map.height), (4, 2)),
            other => panic!("unexpected asset {other:?}"),
        }
    }

    #[test]
    fn test_poll_without_loads_is_empty() {
        let mut loader = AssetLoader::new(".");
        assert!(loader.poll().is_empty());
    }
}
