//! Codecs for virtual trees and edit scripts.

pub mod json;
