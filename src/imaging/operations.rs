//! Variant planning.
//!
//! Combines the pure size calculations with the request's naming and URL
//! rules into a full plan: for each tier that will be generated, the files to
//! encode and the descriptors that will describe them afterwards.

use super::calculations::{PlannedSize, plan_tier_sizes};
use super::params::EncodeParams;
use crate::naming::NamingError;
use crate::request::VariantRequest;
use crate::variants::VariantDescriptor;

/// One output file: how to encode it and how it will be described.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedOutput {
    pub params: EncodeParams,
    pub descriptor: VariantDescriptor,
}

/// All outputs sharing one resized image.
#[derive(Debug, Clone, PartialEq)]
pub struct SizePlan {
    pub size: PlannedSize,
    /// One entry per requested encoding, in request order.
    pub outputs: Vec<PlannedOutput>,
}

/// Plan every output file for a source of the given dimensions.
pub fn plan_variants(
    request: &VariantRequest,
    original_dims: (u32, u32),
) -> Result<Vec<SizePlan>, NamingError> {
    plan_tier_sizes(original_dims, &request.tiers)
        .into_iter()
        .map(|size| {
            let outputs = request
                .formats
                .iter()
                .map(|&encoding| {
                    let filename = request.filename(size.tier, encoding)?;
                    let output = request.output_path(&filename);
                    Ok(PlannedOutput {
                        params: EncodeParams {
                            output: output.clone(),
                            encoding,
                            quality: request.quality,
                            avif_speed: request.avif_speed,
                        },
                        descriptor: VariantDescriptor {
                            url: request.url(&filename),
                            width: size.width,
                            height: size.height,
                            encoding,
                            output_path: output,
                        },
                    })
                })
                .collect::<Result<Vec<_>, NamingError>>()?;
            Ok(SizePlan { size, outputs })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PictureConfig;
    use crate::naming::WidthTier;
    use crate::request::build_request;
    use crate::variants::EncodingKind;
    use std::path::PathBuf;

    #[test]
    fn plans_three_encodings_per_tier() {
        let request = build_request("./src/cat.jpg", &PictureConfig::default());
        let plan = plan_variants(&request, (2000, 1000)).unwrap();

        assert_eq!(plan.len(), 3);
        for size_plan in &plan {
            let encodings: Vec<EncodingKind> =
                size_plan.outputs.iter().map(|o| o.params.encoding).collect();
            assert_eq!(encodings, EncodingKind::PREFERENCE);
        }
    }

    #[test]
    fn plan_names_and_urls_follow_request() {
        let request = build_request("./src/cat.jpg", &PictureConfig::default());
        let plan = plan_variants(&request, (2000, 1000)).unwrap();

        let medium_webp = &plan[1].outputs[1];
        assert_eq!(plan[1].size.tier, WidthTier::Medium);
        assert_eq!(
            medium_webp.params.output,
            PathBuf::from("dist/img/cat_medium.webp")
        );
        assert_eq!(medium_webp.descriptor.url, "/img/cat_medium.webp");
        assert_eq!(
            (medium_webp.descriptor.width, medium_webp.descriptor.height),
            (640, 320)
        );
    }

    #[test]
    fn plan_carries_encoder_settings() {
        let mut config = PictureConfig::default();
        config.encoding.quality = 70;
        config.encoding.avif_speed = 9;
        let request = build_request("cat.jpg", &config);
        let plan = plan_variants(&request, (400, 300)).unwrap();

        let params = &plan[0].outputs[0].params;
        assert_eq!(params.quality.value(), 70);
        assert_eq!(params.avif_speed, 9);
    }

    #[test]
    fn every_output_of_a_size_shares_its_dimensions() {
        let request = build_request("./src/cat.jpg", &PictureConfig::default());
        let plan = plan_variants(&request, (1000, 750)).unwrap();

        for size_plan in &plan {
            for output in &size_plan.outputs {
                assert_eq!(
                    (output.descriptor.width, output.descriptor.height),
                    (size_plan.size.width, size_plan.size.height)
                );
            }
        }
        assert_eq!((plan[1].size.width, plan[1].size.height), (640, 480));
    }

    #[test]
    fn plan_fails_without_file_stem() {
        let request = build_request("./src/..", &PictureConfig::default());
        let result = plan_variants(&request, (2000, 1000));
        assert!(matches!(result, Err(NamingError::NoFileStem(_))));
    }
}
