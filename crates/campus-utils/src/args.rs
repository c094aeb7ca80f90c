mod voice;

pub use voice::VoiceConfig;
