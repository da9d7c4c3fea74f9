mod blocks;
mod bridger;
mod decoder;
mod encoder;
mod unet;

pub use blocks::{
    BasicBlock, BasicBlockConfig, DecoderBlock, DecoderBlockConfig, Head, HeadConfig,
};
pub use bridger::Bridger;
pub use decoder::{Decoder, DecoderConfig};
pub use encoder::{Encoder, EncoderConfig, Features, NUM_STAGES};

pub use unet::{UNet, UNetConfig};
