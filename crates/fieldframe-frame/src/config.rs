/// How the decoder sizes a copy when the local and incoming descriptors of a
/// field disagree on its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizePolicy {
    /// Copy `local.size` bytes. A shorter incoming field makes the copy run
    /// into whatever the writer placed after it.
    Trust,
    /// Copy `min(local.size, incoming.size)` bytes and report the mismatch.
    #[default]
    Clamp,
}

impl SizePolicy {
    /// Number of bytes to copy for a field.
    pub fn copy_len(self, local_size: u16, incoming_size: u16) -> usize {
        match self {
            SizePolicy::Trust => local_size as usize,
            SizePolicy::Clamp => local_size.min(incoming_size) as usize,
        }
    }
}

/// Configuration for frame decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeConfig {
    /// Copy length rule for fields whose size changed between versions.
    /// Default: [`SizePolicy::Clamp`].
    pub size_policy: SizePolicy,
}

impl DecodeConfig {
    /// Decoding that always copies the local field size.
    pub fn trusting() -> Self {
        Self {
            size_policy: SizePolicy::Trust,
        }
    }
}
