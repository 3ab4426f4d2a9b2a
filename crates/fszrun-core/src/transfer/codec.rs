//! 上传载荷编码
//!
//! 文件内容以标准 Base64 编码，末尾追加一个 NUL 字节作为结束标记。
//! 服务端按同样的约定去掉结束标记再解码。

use base64::{Engine as _, engine::general_purpose};

/// 结束标记
pub const TERMINATOR: u8 = 0x00;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Payload is missing the NUL terminator")]
    MissingTerminator,

    #[error("Invalid base64 payload: {0}")]
    InvalidEncoding(String),
}

/// 编码文件内容为上传载荷
pub fn encode_payload(data: &[u8]) -> Vec<u8> {
    let mut payload = general_purpose::STANDARD.encode(data).into_bytes();
    payload.push(TERMINATOR);
    payload
}

/// 解码上传载荷，恰好去掉一个结束标记
pub fn decode_payload(payload: &[u8]) -> Result<Vec<u8>, CodecError> {
    let encoded = payload
        .strip_suffix(&[TERMINATOR])
        .ok_or(CodecError::MissingTerminator)?;

    general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| CodecError::InvalidEncoding(e.to_string()))
}

/// 编码后的载荷长度（含结束标记）
pub fn encoded_len(size: usize) -> usize {
    size.div_ceil(3) * 4 + 1
}
