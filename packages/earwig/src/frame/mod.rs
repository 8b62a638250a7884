mod normalizer;
mod reader;
mod splitter;

pub use normalizer::FrameNormalizer;
pub use reader::{Connect, FrameReader, FrameSource, RawFrame, parse_frame};
pub use splitter::{NormalizedFrame, SubFrameBatch};
