//! Type-state markers for the manager builder
//!
//! Track at compile time whether the URL and the decoder have been set;
//! `build()` only exists once both are present.

use std::marker::PhantomData;

/// Marker trait for URL state
pub trait UrlState {}

/// URL has not been set
pub struct NoUrl;
impl UrlState for NoUrl {}

/// URL has been set
pub struct HasUrl;
impl UrlState for HasUrl {}

/// Marker trait for decoder state
pub trait DecoderState {}

/// Decoder has not been set
pub struct NoDecoder;
impl DecoderState for NoDecoder {}

/// Decoder has been set
pub struct HasDecoder;
impl DecoderState for HasDecoder {}

/// Phantom marker carrying both states
#[derive(Debug, Clone, Copy)]
pub struct TypeState<U, S> {
    _url: PhantomData<U>,
    _decoder: PhantomData<S>,
}

impl<U, S> TypeState<U, S> {
    pub(crate) fn new() -> Self {
        Self {
            _url: PhantomData,
            _decoder: PhantomData,
        }
    }
}
