//! Text-layer rendering entry point
//!
//! Drives the injected layer populator for one page, then hands the
//! populated container to the row merger. Merging reads rendered geometry,
//! so by default it is deferred: the render call queues a merge job and the
//! host drains the queue once its layout pass has settled (the explicit
//! populate-then-merge contract). Hosts whose geometry is already stable may
//! opt into merging inside the render call.

use crate::deferred::{MergeJob, MergeScheduler, TextLayerConfig};
use crate::measure::Measure;
use crate::merge::{MergeStats, RowMerger};
use layer_model::{LayerContainer, LayerId, TextContent, Viewport};
use tracing::debug;

/// Error produced by a layer populator, passed through untranslated
pub type PopulateError = Box<dyn std::error::Error + Send + Sync>;

/// Fills a container with one positioned element per extracted glyph
///
/// External collaborator: the PDF parsing and rendering pipeline behind this
/// trait is out of scope. `render` is synchronous and complete on return.
pub trait LayerPopulator {
    /// Accept the extracted-text descriptor
    fn set_text_content(&mut self, text_content: &TextContent);

    /// Fill the container with positioned glyph elements
    fn render(&mut self, container: &mut LayerContainer) -> Result<(), PopulateError>;
}

/// Produces layer populators bound to a page and viewport
pub trait PopulatorFactory {
    type Populator: LayerPopulator;

    /// Build a populator for a 0-based page index under the given viewport
    fn create_populator(&self, page_index: u32, viewport: &Viewport) -> Self::Populator;
}

/// Error types for text-layer rendering
#[derive(Debug, thiserror::Error)]
pub enum TextLayerError {
    #[error("page number must be 1-based, got {0}")]
    InvalidPageNumber(u32),

    #[error("text layer population failed: {0}")]
    Populate(#[from] PopulateError),
}

pub type TextLayerResult<T> = Result<T, TextLayerError>;

/// The options for rendering one page's text layer
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Identity of the target container, used to key deferred merge jobs
    pub layer_id: LayerId,

    /// 1-based page number in the document; translated to a 0-based index
    /// before reaching the populator
    pub page_number: u32,

    /// Viewport descriptor, passed through to the populator unmodified
    pub viewport: Viewport,

    /// Extracted text descriptor, passed through to the populator unmodified
    pub text_content: TextContent,
}

/// Renders and merges the selectable text layer for rendered PDF pages
pub struct TextLayerRenderer<F: PopulatorFactory, M: Measure> {
    factory: F,
    merger: RowMerger<M>,
    config: TextLayerConfig,
    scheduler: MergeScheduler,
}

impl<F: PopulatorFactory, M: Measure> TextLayerRenderer<F, M> {
    /// Create a renderer with the default configuration (deferred merging)
    pub fn new(factory: F, measure: M) -> Self {
        Self::with_config(factory, measure, TextLayerConfig::default())
    }

    /// Create a renderer with the given configuration
    pub fn with_config(factory: F, measure: M, config: TextLayerConfig) -> Self {
        let merger = RowMerger::new(measure).with_ordering(config.row_ordering);
        Self { factory, merger, config, scheduler: MergeScheduler::new() }
    }

    /// Get the configuration
    pub fn config(&self) -> &TextLayerConfig {
        &self.config
    }

    /// Render the text layer for a page into `container`
    ///
    /// Populates the container through the factory's populator and either
    /// merges immediately (`run_immediately`) or queues a merge job for the
    /// host to drain after layout. Failure leaves whatever the populator
    /// wrote: the layer degrades to per-glyph selection, page rendering
    /// itself is unaffected.
    pub fn render(
        &mut self,
        options: RenderOptions,
        container: &mut LayerContainer,
    ) -> TextLayerResult<()> {
        if options.page_number < 1 {
            return Err(TextLayerError::InvalidPageNumber(options.page_number));
        }
        let page_index = options.page_number - 1;

        let mut populator = self.factory.create_populator(page_index, &options.viewport);
        populator.set_text_content(&options.text_content);
        populator.render(container)?;

        if self.config.run_immediately {
            self.merger.merge(container);
        } else {
            self.scheduler.schedule(MergeJob::new(options.layer_id, page_index));
        }

        debug!(
            page_index,
            glyphs = container.len(),
            deferred = !self.config.run_immediately,
            "rendered text layer"
        );
        Ok(())
    }

    /// Second phase of the populate-then-merge contract
    ///
    /// The host calls this for each drained [`MergeJob`], after confirming
    /// population is complete and layout has stabilized.
    pub fn merge(&self, container: &mut LayerContainer) -> MergeStats {
        self.merger.merge(container)
    }

    /// Check if any merge passes are queued
    pub fn has_pending(&self) -> bool {
        self.scheduler.has_pending()
    }

    /// Drain all queued merge jobs
    pub fn take_pending(&mut self) -> Vec<MergeJob> {
        self.scheduler.take_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::FixedAdvanceMeasure;
    use layer_model::LayerElement;
    use std::sync::{Arc, Mutex};

    /// Populator that emits one glyph per character of every text item
    struct FakePopulator {
        items: Vec<String>,
        fail: bool,
    }

    impl LayerPopulator for FakePopulator {
        fn set_text_content(&mut self, text_content: &TextContent) {
            self.items = text_content.items.iter().map(|item| item.text.clone()).collect();
        }

        fn render(&mut self, container: &mut LayerContainer) -> Result<(), PopulateError> {
            if self.fail {
                return Err("populator offline".into());
            }
            let mut x = 0.0;
            for item in &self.items {
                for c in item.chars() {
                    container.push(LayerElement::new(
                        format!("left:{x}px; top:20px; font-size:12px;"),
                        c.to_string(),
                    ));
                    x += 10.0;
                }
            }
            Ok(())
        }
    }

    struct FakeFactory {
        seen_page_index: Arc<Mutex<Option<u32>>>,
        fail: bool,
    }

    impl FakeFactory {
        fn new() -> Self {
            Self { seen_page_index: Arc::new(Mutex::new(None)), fail: false }
        }

        fn failing() -> Self {
            Self { seen_page_index: Arc::new(Mutex::new(None)), fail: true }
        }
    }

    impl PopulatorFactory for FakeFactory {
        type Populator = FakePopulator;

        fn create_populator(&self, page_index: u32, _viewport: &Viewport) -> FakePopulator {
            *self.seen_page_index.lock().unwrap() = Some(page_index);
            FakePopulator { items: Vec::new(), fail: self.fail }
        }
    }

    fn options(page_number: u32, text: &str) -> RenderOptions {
        RenderOptions {
            layer_id: LayerId::new_v4(),
            page_number,
            viewport: Viewport::default(),
            text_content: TextContent {
                items: vec![layer_model::TextItem {
                    text: text.to_string(),
                    transform: [1.0, 0.0, 0.0, 1.0, 0.0, 20.0],
                    width: 10.0 * text.len() as f32,
                    height: 12.0,
                    font_name: None,
                }],
            },
        }
    }

    fn renderer_with(
        factory: FakeFactory,
        config: TextLayerConfig,
    ) -> TextLayerRenderer<FakeFactory, FixedAdvanceMeasure> {
        TextLayerRenderer::with_config(factory, FixedAdvanceMeasure::new(10.0, 12.0), config)
    }

    #[test]
    fn test_render_translates_page_number_to_zero_based() {
        let factory = FakeFactory::new();
        let seen = factory.seen_page_index.clone();
        let mut renderer = TextLayerRenderer::new(factory, FixedAdvanceMeasure::new(10.0, 12.0));
        let mut container = LayerContainer::new();

        renderer.render(options(3, "Hi"), &mut container).unwrap();

        assert_eq!(*seen.lock().unwrap(), Some(2));
    }

    #[test]
    fn test_render_rejects_page_number_zero() {
        let mut renderer =
            TextLayerRenderer::new(FakeFactory::new(), FixedAdvanceMeasure::new(10.0, 12.0));
        let mut container = LayerContainer::new();

        let result = renderer.render(options(0, "Hi"), &mut container);

        assert!(matches!(result, Err(TextLayerError::InvalidPageNumber(0))));
        assert!(container.is_empty());
        assert!(!renderer.has_pending());
    }

    #[test]
    fn test_populate_error_propagates_untranslated() {
        let mut renderer =
            TextLayerRenderer::new(FakeFactory::failing(), FixedAdvanceMeasure::new(10.0, 12.0));
        let mut container = LayerContainer::new();

        let error = renderer.render(options(1, "Hi"), &mut container).unwrap_err();

        assert!(matches!(error, TextLayerError::Populate(_)));
        assert!(error.to_string().contains("populator offline"));
        // Nothing was queued for a layer that never populated.
        assert!(!renderer.has_pending());
    }

    #[test]
    fn test_render_defers_merge_by_default() {
        let mut renderer =
            TextLayerRenderer::new(FakeFactory::new(), FixedAdvanceMeasure::new(10.0, 12.0));
        let mut container = LayerContainer::new();
        let opts = options(1, "Hi");
        let layer_id = opts.layer_id;

        renderer.render(opts, &mut container).unwrap();

        // Still one element per glyph until the host drains the queue.
        assert_eq!(container.len(), 2);
        assert!(renderer.has_pending());

        let jobs = renderer.take_pending();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].layer_id, layer_id);
        assert_eq!(jobs[0].page_index, 0);

        let stats = renderer.merge(&mut container);
        assert_eq!(container.len(), 1);
        assert_eq!(container.children[0].text, "Hi");
        assert_eq!(stats.glyphs, 2);
        assert!(!renderer.has_pending());
    }

    #[test]
    fn test_render_merges_immediately_when_configured() {
        let config = TextLayerConfig::new().with_run_immediately(true);
        let mut renderer = renderer_with(FakeFactory::new(), config);
        let mut container = LayerContainer::new();

        renderer.render(options(1, "Hi"), &mut container).unwrap();

        assert_eq!(container.len(), 1);
        assert_eq!(container.children[0].text, "Hi");
        assert!(!renderer.has_pending());
    }

    #[test]
    fn test_rendering_same_layer_twice_keeps_one_job() {
        let mut renderer =
            TextLayerRenderer::new(FakeFactory::new(), FixedAdvanceMeasure::new(10.0, 12.0));
        let mut container = LayerContainer::new();
        let opts = options(1, "Hi");

        renderer.render(opts.clone(), &mut container).unwrap();
        container.clear();
        renderer.render(opts, &mut container).unwrap();

        assert_eq!(renderer.take_pending().len(), 1);
    }
}
