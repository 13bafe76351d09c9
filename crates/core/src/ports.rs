//! External Ports
//!
//! The neural segmentation model is an external collaborator: the loop only
//! depends on this narrow contract. Implementations are expected to be
//! expensive to construct and are shared via `Arc` handles (see the
//! orchestrator's model pool).

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::mask::{Image, Mask};

/// Pixel-level object segmentation port.
///
/// `segment` must return a mask with the same height and width as `image`.
#[async_trait]
pub trait Segmenter: Send + Sync {
    /// Segment `object_label` in the full image.
    async fn segment(&self, object_label: &str, image: &Image) -> CoreResult<Mask>;
}
