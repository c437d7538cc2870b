//! Variant producer trait and shared error type.
//!
//! A [`VariantProducer`] turns a [`VariantRequest`] into files on disk and
//! hands back the [`VariantSet`] describing them. The shortcodes only ever
//! see this trait, so markup logic is tested against a mock that never
//! touches pixels.
//!
//! The production implementation is
//! [`RustProducer`](super::rust_producer::RustProducer).

use crate::naming::NamingError;
use crate::request::VariantRequest;
use crate::variants::VariantSet;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source image not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("Naming failed: {0}")]
    Naming(#[from] NamingError),
}

/// Generates the variants a request asks for.
///
/// `Sync` so the base and detail sources of one shortcode can be produced
/// concurrently from a shared reference.
pub trait VariantProducer: Sync {
    fn produce(&self, request: &VariantRequest) -> Result<VariantSet, ProducerError>;
}

impl<P: VariantProducer + ?Sized> VariantProducer for &P {
    fn produce(&self, request: &VariantRequest) -> Result<VariantSet, ProducerError> {
        (**self).produce(request)
    }
}

impl<P: VariantProducer + ?Sized> VariantProducer for Box<P> {
    fn produce(&self, request: &VariantRequest) -> Result<VariantSet, ProducerError> {
        (**self).produce(request)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::config::PictureConfig;
    use crate::imaging::operations::plan_variants;
    use crate::request::build_request;
    use crate::variants::EncodingKind;
    use std::sync::Mutex;

    /// Mock producer that plans variants without writing anything.
    ///
    /// Every source is treated as having the same dimensions. Requests are
    /// recorded in call order; sources containing `fail_on` fail.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon::join.
    pub struct MockProducer {
        pub dimensions: (u32, u32),
        pub fail_on: Option<String>,
        pub requests: Mutex<Vec<VariantRequest>>,
    }

    impl Default for MockProducer {
        fn default() -> Self {
            Self::with_dimensions((2560, 1600))
        }
    }

    impl MockProducer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(dimensions: (u32, u32)) -> Self {
            Self {
                dimensions,
                fail_on: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing_on(pattern: &str) -> Self {
            Self {
                fail_on: Some(pattern.to_string()),
                ..Self::default()
            }
        }

        /// Sources requested so far, sorted (concurrent calls have no order).
        pub fn requested_sources(&self) -> Vec<String> {
            let mut sources: Vec<String> = self
                .requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.source.clone())
                .collect();
            sources.sort();
            sources
        }
    }

    impl VariantProducer for MockProducer {
        fn produce(&self, request: &VariantRequest) -> Result<VariantSet, ProducerError> {
            self.requests.lock().unwrap().push(request.clone());

            if let Some(pattern) = &self.fail_on
                && request.source.contains(pattern.as_str())
            {
                return Err(ProducerError::ProcessingFailed(format!(
                    "mock failure for {}",
                    request.source
                )));
            }

            Ok(plan_variants(request, self.dimensions)?
                .into_iter()
                .flat_map(|plan| plan.outputs)
                .map(|output| output.descriptor)
                .collect())
        }
    }

    #[test]
    fn mock_records_requests() {
        let producer = MockProducer::new();
        let request = build_request("./src/cat.jpg", &PictureConfig::default());
        producer.produce(&request).unwrap();

        assert_eq!(producer.requested_sources(), vec!["./src/cat.jpg"]);
    }

    #[test]
    fn mock_plans_every_tier_and_encoding() {
        let producer = MockProducer::new();
        let request = build_request("./src/cat.jpg", &PictureConfig::default());
        let set = producer.produce(&request).unwrap();

        assert_eq!(set.len(), 9);
        let jpegs = set.get(EncodingKind::Jpeg).unwrap();
        assert_eq!(jpegs[0].url, "/img/cat_small.jpeg");
        assert_eq!((jpegs[0].width, jpegs[0].height), (320, 200));
    }

    #[test]
    fn mock_failure_propagates() {
        let producer = MockProducer::failing_on("broken");
        let request = build_request("./src/broken.jpg", &PictureConfig::default());
        let result = producer.produce(&request);
        assert!(matches!(result, Err(ProducerError::ProcessingFailed(_))));
    }

    #[test]
    fn references_and_boxes_are_producers() {
        let producer = MockProducer::new();
        let request = build_request("./src/cat.jpg", &PictureConfig::default());

        let by_ref: &MockProducer = &producer;
        assert!(VariantProducer::produce(&by_ref, &request).is_ok());

        let boxed: Box<dyn VariantProducer + Send> = Box::new(MockProducer::new());
        assert!(boxed.produce(&request).is_ok());
    }
}
