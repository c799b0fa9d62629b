//! Backend API wire types
//!
//! Request and response bodies exchanged with the PartMix backend, and the
//! conversions between them and the models in [`crate::models`].

pub mod types;

pub use types::{
    CreateMixPackageRequest, CreateMixRequest, MixTrackDto, PartTrackDto, StereoMixDto, TrackDto,
};
