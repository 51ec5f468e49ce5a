use bitflags::bitflags;

bitflags! {
    /// Decoder flags, passed to the engine when a session is initialized.
    ///
    /// The bit values are liblzma's `LZMA_TELL_*`, `LZMA_CONCATENATED` and
    /// `LZMA_IGNORE_CHECK` constants.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct DecoderFlags: u32 {
        /// Report a stream without an integrity check as `Status::NoCheck`.
        const TELL_NO_CHECK = 0x01;

        /// Report an integrity check type the library cannot verify as
        /// `Status::UnsupportedCheck`.
        const TELL_UNSUPPORTED_CHECK = 0x02;

        /// Report `Status::GetCheck` once the check type is known.
        const TELL_ANY_CHECK = 0x04;

        /// Keep decoding after the first stream ends.
        ///
        /// Needed for `.xz` files made by concatenating several streams,
        /// which `xz` itself decodes as a single output.
        const CONCATENATED = 0x08;

        /// Skip integrity check verification. Corrupt data then goes unnoticed
        /// unless the decoder itself trips over it.
        const IGNORE_CHECK = 0x10;
    }
}
