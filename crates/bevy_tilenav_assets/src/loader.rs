use bevy::{
    asset::{AssetLoader, LoadContext, io::Reader},
    prelude::*,
    tasks::ConditionalSendFuture,
};
use thiserror::Error;

use crate::document::LevelDocument;
use crate::error::ParseError;
use crate::parser::parse_level;

/// A parsed level, loaded from a `.tmx` file.
#[derive(TypePath, Asset, Debug)]
pub struct LevelAsset {
    /// The parsed document (read-only after load)
    pub document: LevelDocument,
}

/// Asset loader for Tiled levels (.tmx files)
///
/// Only embedded tilesets are read; the level is self-contained and loads no dependencies.
///
/// Layer data must be XML `<tile>` elements or CSV. Base64 and compressed (`zlib`, `gzip`,
/// `zstd`) layer data fails with [`ParseError::UnsupportedEncoding`]; re-save such maps with
/// the CSV layer format.
#[derive(Default)]
pub struct LevelAssetLoader;

#[derive(Debug, Error)]
pub enum LevelLoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Level is not valid UTF-8: {0}")]
    Utf8(#[from] core::str::Utf8Error),

    #[error("Failed to parse level: {0}")]
    Parse(#[from] ParseError),
}

impl AssetLoader for LevelAssetLoader {
    type Asset = LevelAsset;
    type Settings = ();
    type Error = LevelLoaderError;

    fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        load_context: &mut LoadContext,
    ) -> impl ConditionalSendFuture<Output = Result<Self::Asset, Self::Error>> {
        async move {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).await?;
            let text = core::str::from_utf8(&bytes)?;

            let document = parse_level(text)?;
            info!(
                "Loaded level '{}': {}x{} {} map, {} layers",
                load_context.asset_path(),
                document.width,
                document.height,
                document.orientation.as_str(),
                document.layer_names.len()
            );

            Ok(LevelAsset { document })
        }
    }

    fn extensions(&self) -> &[&str] {
        &["tmx"]
    }
}
