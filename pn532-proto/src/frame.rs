//! PN532 frame encoding and decoding.
//!
//! Pure functions over byte slices; no I/O and no allocation. The decoder
//! reports every failure mode as a distinct [`DecodeError`] so the session
//! layer can tell transient garbage from genuine frame-sync loss.

/// Frame preamble byte.
pub const PREAMBLE: u8 = 0x00;
/// Frame postamble byte.
pub const POSTAMBLE: u8 = 0x00;
/// Two-byte start code following the preamble.
pub const START_CODE: [u8; 2] = [0x00, 0xFF];
/// Frame identifier for host-to-device frames.
pub const TFI_HOST_TO_DEVICE: u8 = 0xD4;
/// Frame identifier for device-to-host frames.
pub const TFI_DEVICE_TO_HOST: u8 = 0xD5;

/// The fixed acknowledgement frame the device sends before its response.
pub const ACK_FRAME: [u8; 6] = [0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00];

/// Maximum number of command parameter bytes.
///
/// `LEN` is a single byte and counts the TFI and opcode as well, so at most
/// 252 parameter bytes fit in one frame.
pub const MAX_PARAMS: usize = 252;

/// Size of the frame envelope around the data bytes: preamble, start code,
/// `LEN`, `LCS`, `DCS` and postamble.
pub const ENVELOPE_SIZE: usize = 7;

/// Largest possible encoded command frame.
pub const MAX_FRAME_SIZE: usize = MAX_PARAMS + 2 + ENVELOPE_SIZE;

/// Error type for command encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// More than [`MAX_PARAMS`] parameter bytes.
    TooManyParams,
    /// Output buffer cannot hold the frame.
    BufferTooSmall,
}

/// Error type for response decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// No `0xFF` start code after the leading zero bytes.
    MissingStartCode,
    /// `LEN + LCS` is not zero mod 256.
    LengthChecksumMismatch,
    /// The `TFI..=DCS` window does not sum to zero mod 256.
    DataChecksumMismatch,
    /// Payload does not begin with `0xD5` and the expected opcode echo.
    UnexpectedResponse,
    /// Input ended before the frame did.
    TruncatedFrame,
}

/// Encode a command frame into `buf`, returning the encoded length.
///
/// The frame carries `TFI_HOST_TO_DEVICE`, the opcode and the parameter
/// bytes, wrapped in the checksummed envelope.
///
/// # Errors
///
/// - [`EncodeError::TooManyParams`] if `params.len() > MAX_PARAMS`
/// - [`EncodeError::BufferTooSmall`] if `buf` is too short
pub fn encode_command(buf: &mut [u8], opcode: u8, params: &[u8]) -> Result<usize, EncodeError> {
    if params.len() > MAX_PARAMS {
        return Err(EncodeError::TooManyParams);
    }
    let total = params.len() + 2 + ENVELOPE_SIZE;
    if buf.len() < total {
        return Err(EncodeError::BufferTooSmall);
    }

    // LEN counts TFI, opcode and parameters.
    let len = (params.len() + 2) as u8;
    buf[0] = PREAMBLE;
    buf[1] = START_CODE[0];
    buf[2] = START_CODE[1];
    buf[3] = len;
    buf[4] = len.wrapping_neg();
    buf[5] = TFI_HOST_TO_DEVICE;
    buf[6] = opcode;
    buf[7..7 + params.len()].copy_from_slice(params);

    let sum = params.iter().fold(
        TFI_HOST_TO_DEVICE.wrapping_add(opcode),
        |acc, &b| acc.wrapping_add(b),
    );
    buf[7 + params.len()] = sum.wrapping_neg();
    buf[8 + params.len()] = POSTAMBLE;

    Ok(total)
}

/// Encode a command frame into a fixed-capacity vector.
#[cfg(feature = "heapless")]
pub fn encode_command_vec(
    opcode: u8,
    params: &[u8],
) -> Result<heapless::Vec<u8, MAX_FRAME_SIZE>, EncodeError> {
    let mut buf = [0u8; MAX_FRAME_SIZE];
    let len = encode_command(&mut buf, opcode, params)?;
    let mut out = heapless::Vec::new();
    // Cannot fail: len <= MAX_FRAME_SIZE
    let _ = out.extend_from_slice(&buf[..len]);
    Ok(out)
}

/// Check whether `bytes` is exactly the 6-byte acknowledgement frame.
#[inline]
#[must_use]
pub fn decode_ack(bytes: &[u8]) -> bool {
    bytes == ACK_FRAME
}

/// Decode and validate a device-to-host response frame.
///
/// Scans past leading `0x00` bytes to find the start code, verifies both
/// checksums, and requires the payload to begin with `0xD5` followed by
/// `expected_opcode + 1`. Returns the result bytes after those two header
/// bytes.
///
/// # Errors
///
/// Each failure mode maps to a distinct [`DecodeError`]; a malformed frame
/// never yields partial data.
pub fn decode_response(bytes: &[u8], expected_opcode: u8) -> Result<&[u8], DecodeError> {
    // Skip the preamble run; the device may pad with extra zeros.
    let mut offset = 0;
    while offset < bytes.len() && bytes[offset] == 0x00 {
        offset += 1;
    }
    if offset >= bytes.len() || bytes[offset] != 0xFF {
        return Err(DecodeError::MissingStartCode);
    }
    offset += 1;

    if bytes.len() < offset + 2 {
        return Err(DecodeError::TruncatedFrame);
    }
    let len = bytes[offset] as usize;
    let lcs = bytes[offset + 1];
    if bytes[offset].wrapping_add(lcs) != 0 {
        return Err(DecodeError::LengthChecksumMismatch);
    }

    // LEN data bytes plus the trailing DCS.
    let body_start = offset + 2;
    if bytes.len() < body_start + len + 1 {
        return Err(DecodeError::TruncatedFrame);
    }
    let window = &bytes[body_start..body_start + len + 1];
    let sum = window.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    if sum != 0 {
        return Err(DecodeError::DataChecksumMismatch);
    }

    let payload = &window[..len];
    if payload.len() < 2
        || payload[0] != TFI_DEVICE_TO_HOST
        || payload[1] != expected_opcode.wrapping_add(1)
    {
        return Err(DecodeError::UnexpectedResponse);
    }

    Ok(&payload[2..])
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;

    /// Build a device-style reply frame carrying `result` for `opcode`.
    fn device_frame(opcode: u8, result: &[u8]) -> Vec<u8> {
        let mut frame = std::vec![PREAMBLE, START_CODE[0], START_CODE[1]];
        let len = (result.len() + 2) as u8;
        frame.push(len);
        frame.push(len.wrapping_neg());
        frame.push(TFI_DEVICE_TO_HOST);
        frame.push(opcode.wrapping_add(1));
        frame.extend_from_slice(result);
        let sum = result.iter().fold(
            TFI_DEVICE_TO_HOST.wrapping_add(opcode.wrapping_add(1)),
            |acc, &b| acc.wrapping_add(b),
        );
        frame.push(sum.wrapping_neg());
        frame.push(POSTAMBLE);
        frame
    }

    #[test]
    fn test_encode_firmware_query() {
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let len = encode_command(&mut buf, 0x02, &[]).unwrap();
        assert_eq!(&buf[..len], &[0x00, 0x00, 0xFF, 0x02, 0xFE, 0xD4, 0x02, 0x2A, 0x00]);
    }

    #[test]
    fn test_encode_sam_configuration() {
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let len = encode_command(&mut buf, 0x14, &[0x01, 0x14, 0x01]).unwrap();
        // LEN = 5 (TFI + opcode + 3 params), DCS = -(D4+14+01+14+01)
        assert_eq!(
            &buf[..len],
            &[0x00, 0x00, 0xFF, 0x05, 0xFB, 0xD4, 0x14, 0x01, 0x14, 0x01, 0x02, 0x00]
        );
    }

    #[test]
    fn test_encode_length_checksum_invariant() {
        let mut buf = [0u8; MAX_FRAME_SIZE];
        for n in [0usize, 1, 7, 100, MAX_PARAMS] {
            let params = std::vec![0xAB; n];
            let len = encode_command(&mut buf, 0x4A, &params).unwrap();
            assert_eq!(buf[3].wrapping_add(buf[4]), 0, "LEN + LCS for {n} params");
            assert_eq!(len, n + 9);
        }
    }

    #[test]
    fn test_encode_too_many_params() {
        let mut buf = [0u8; 512];
        let params = [0u8; MAX_PARAMS + 1];
        assert_eq!(
            encode_command(&mut buf, 0x4A, &params),
            Err(EncodeError::TooManyParams)
        );
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let mut buf = [0u8; 8];
        assert_eq!(
            encode_command(&mut buf, 0x02, &[]),
            Err(EncodeError::BufferTooSmall)
        );
    }

    #[test]
    fn test_decode_ack_exact() {
        assert!(decode_ack(&[0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00]));
    }

    #[test]
    fn test_decode_ack_rejects_everything_else() {
        // Flip each byte of the valid pattern in turn.
        for i in 0..ACK_FRAME.len() {
            let mut ack = ACK_FRAME;
            ack[i] ^= 0x01;
            assert!(!decode_ack(&ack), "byte {i} flipped");
        }
        assert!(!decode_ack(&[]));
        assert!(!decode_ack(&ACK_FRAME[..5]));
        assert!(!decode_ack(&[0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0x00]));
    }

    #[test]
    fn test_decode_round_trip() {
        let result = [0x01, 0x02, 0x03, 0x04];
        let reply = device_frame(0x02, &result);
        assert_eq!(decode_response(&reply, 0x02).unwrap(), &result);
    }

    #[test]
    fn test_decode_empty_result() {
        let reply = device_frame(0x14, &[]);
        assert_eq!(decode_response(&reply, 0x14).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn test_decode_tolerates_extra_preamble_zeros() {
        let mut reply = std::vec![0x00, 0x00, 0x00];
        reply.extend_from_slice(&device_frame(0x02, &[0x32, 0x01, 0x06, 0x07])[1..]);
        assert_eq!(
            decode_response(&reply, 0x02).unwrap(),
            &[0x32, 0x01, 0x06, 0x07]
        );
    }

    #[test]
    fn test_decode_missing_start_code() {
        assert_eq!(
            decode_response(&[0x00, 0x00, 0x55, 0x03], 0x02),
            Err(DecodeError::MissingStartCode)
        );
        // All zeros never reach a start code.
        assert_eq!(
            decode_response(&[0x00; 8], 0x02),
            Err(DecodeError::MissingStartCode)
        );
        assert_eq!(decode_response(&[], 0x02), Err(DecodeError::MissingStartCode));
    }

    #[test]
    fn test_decode_length_checksum_mismatch() {
        let mut reply = device_frame(0x02, &[0x32, 0x01, 0x06, 0x07]);
        reply[4] = reply[4].wrapping_add(1);
        assert_eq!(
            decode_response(&reply, 0x02),
            Err(DecodeError::LengthChecksumMismatch)
        );
    }

    #[test]
    fn test_decode_data_checksum_mismatch_any_flipped_byte() {
        let result = [0x32, 0x01, 0x06, 0x07];
        let reply = device_frame(0x02, &result);
        // Flipping any single byte of the DATA or DCS region must fail the
        // data checksum, never succeed.
        let data_start = 5; // TFI position
        let dcs_pos = reply.len() - 2;
        for i in (data_start + 2)..=dcs_pos {
            let mut corrupted = reply.clone();
            corrupted[i] ^= 0x40;
            assert_eq!(
                decode_response(&corrupted, 0x02),
                Err(DecodeError::DataChecksumMismatch),
                "byte {i} flipped"
            );
        }
    }

    #[test]
    fn test_decode_wrong_opcode_echo() {
        let reply = device_frame(0x02, &[0x32, 0x01, 0x06, 0x07]);
        assert_eq!(
            decode_response(&reply, 0x4A),
            Err(DecodeError::UnexpectedResponse)
        );
    }

    #[test]
    fn test_decode_wrong_tfi() {
        let mut reply = device_frame(0x02, &[0x32]);
        // Replace the TFI and fix the data checksum so only the TFI is wrong.
        reply[5] = TFI_HOST_TO_DEVICE;
        let dcs_pos = reply.len() - 2;
        reply[dcs_pos] = reply[dcs_pos].wrapping_add(0xD5 - 0xD4);
        assert_eq!(
            decode_response(&reply, 0x02),
            Err(DecodeError::UnexpectedResponse)
        );
    }

    #[test]
    fn test_decode_truncated() {
        let reply = device_frame(0x02, &[0x32, 0x01, 0x06, 0x07]);
        for cut in 4..reply.len() - 2 {
            let err = decode_response(&reply[..cut], 0x02).unwrap_err();
            assert!(
                matches!(
                    err,
                    DecodeError::TruncatedFrame | DecodeError::MissingStartCode
                ),
                "cut at {cut}: {err:?}"
            );
        }
    }

    #[cfg(feature = "heapless")]
    #[test]
    fn test_encode_command_vec_matches_slice() {
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let len = encode_command(&mut buf, 0x4A, &[0x01, 0x00]).unwrap();
        let vec = encode_command_vec(0x4A, &[0x01, 0x00]).unwrap();
        assert_eq!(vec.as_slice(), &buf[..len]);
    }
}
