//! Token-level MessagePack reader.
//!
//! Decodes one token at a time from a cursor position, reporting byte spans
//! rather than materialized values: string and binary payloads are skipped,
//! never copied. Numeric scalars are decoded inline since their value rides
//! in the token bytes anyway.

use packpath_buffers::{Reader, Span};

use crate::DocumentError;

/// Kind of a decoded token. Container headers carry their declared child
/// count; the children follow as separate tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str,
    Bin,
    MapHeader(u32),
    ArrayHeader(u32),
}

/// One decoded token.
///
/// `span` covers the token's full encoding: header plus payload for scalars,
/// header bytes only for containers. `value_span` narrows to the payload for
/// `Str`/`Bin` and equals `span` for everything else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub value_span: Span,
}

impl Token {
    /// Declared child count for container headers. Map counts are in
    /// entries (key/value pairs), not tokens.
    pub fn child_count(&self) -> Option<u32> {
        match self.kind {
            TokenKind::MapHeader(n) | TokenKind::ArrayHeader(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::MapHeader(_) | TokenKind::ArrayHeader(_)
        )
    }
}

/// Stateless decoder for single MessagePack tokens.
pub struct TokenReader;

fn truncated(reader: &Reader<'_>) -> DocumentError {
    DocumentError::Truncated {
        offset: reader.pos(),
    }
}

impl TokenReader {
    /// Decodes the next token at the reader's cursor, advancing past it
    /// (for containers: past the header only).
    pub fn read_token(reader: &mut Reader<'_>) -> Result<Token, DocumentError> {
        let start = reader.pos();
        let byte = reader.u8().map_err(|_| truncated(reader))?;

        // negative fixint: 0xe0-0xff
        if byte >= 0xe0 {
            return Ok(Self::scalar(TokenKind::Int(byte as i8 as i64), start, reader));
        }
        // positive fixint: 0x00-0x7f
        if byte <= 0x7f {
            return Ok(Self::scalar(TokenKind::Int(byte as i64), start, reader));
        }
        // fixmap: 0x80-0x8f
        if (0x80..=0x8f).contains(&byte) {
            return Ok(Self::scalar(
                TokenKind::MapHeader((byte & 0xf) as u32),
                start,
                reader,
            ));
        }
        // fixarray: 0x90-0x9f
        if (0x90..=0x9f).contains(&byte) {
            return Ok(Self::scalar(
                TokenKind::ArrayHeader((byte & 0xf) as u32),
                start,
                reader,
            ));
        }
        // fixstr: 0xa0-0xbf
        if (0xa0..=0xbf).contains(&byte) {
            return Self::payload(TokenKind::Str, (byte & 0x1f) as usize, start, reader);
        }

        match byte {
            0xc0 => Ok(Self::scalar(TokenKind::Nil, start, reader)),
            0xc2 => Ok(Self::scalar(TokenKind::Bool(false), start, reader)),
            0xc3 => Ok(Self::scalar(TokenKind::Bool(true), start, reader)),
            // bin8, bin16, bin32
            0xc4 => {
                let n = reader.u8().map_err(|_| truncated(reader))? as usize;
                Self::payload(TokenKind::Bin, n, start, reader)
            }
            0xc5 => {
                let n = reader.u16().map_err(|_| truncated(reader))? as usize;
                Self::payload(TokenKind::Bin, n, start, reader)
            }
            0xc6 => {
                let n = reader.u32().map_err(|_| truncated(reader))? as usize;
                Self::payload(TokenKind::Bin, n, start, reader)
            }
            // float32, float64
            0xca => {
                let v = reader.f32().map_err(|_| truncated(reader))?;
                Ok(Self::scalar(TokenKind::Float(v as f64), start, reader))
            }
            0xcb => {
                let v = reader.f64().map_err(|_| truncated(reader))?;
                Ok(Self::scalar(TokenKind::Float(v), start, reader))
            }
            // uint8, uint16, uint32, uint64
            0xcc => {
                let v = reader.u8().map_err(|_| truncated(reader))?;
                Ok(Self::scalar(TokenKind::Int(v as i64), start, reader))
            }
            0xcd => {
                let v = reader.u16().map_err(|_| truncated(reader))?;
                Ok(Self::scalar(TokenKind::Int(v as i64), start, reader))
            }
            0xce => {
                let v = reader.u32().map_err(|_| truncated(reader))?;
                Ok(Self::scalar(TokenKind::Int(v as i64), start, reader))
            }
            0xcf => {
                let v = reader.u64().map_err(|_| truncated(reader))?;
                Ok(Self::scalar(TokenKind::Int(v as i64), start, reader))
            }
            // int8, int16, int32, int64
            0xd0 => {
                let v = reader.i8().map_err(|_| truncated(reader))?;
                Ok(Self::scalar(TokenKind::Int(v as i64), start, reader))
            }
            0xd1 => {
                let v = reader.i16().map_err(|_| truncated(reader))?;
                Ok(Self::scalar(TokenKind::Int(v as i64), start, reader))
            }
            0xd2 => {
                let v = reader.i32().map_err(|_| truncated(reader))?;
                Ok(Self::scalar(TokenKind::Int(v as i64), start, reader))
            }
            0xd3 => {
                let v = reader.i64().map_err(|_| truncated(reader))?;
                Ok(Self::scalar(TokenKind::Int(v), start, reader))
            }
            // str8, str16, str32
            0xd9 => {
                let n = reader.u8().map_err(|_| truncated(reader))? as usize;
                Self::payload(TokenKind::Str, n, start, reader)
            }
            0xda => {
                let n = reader.u16().map_err(|_| truncated(reader))? as usize;
                Self::payload(TokenKind::Str, n, start, reader)
            }
            0xdb => {
                let n = reader.u32().map_err(|_| truncated(reader))? as usize;
                Self::payload(TokenKind::Str, n, start, reader)
            }
            // array16, array32
            0xdc => {
                let n = reader.u16().map_err(|_| truncated(reader))?;
                Ok(Self::scalar(TokenKind::ArrayHeader(n as u32), start, reader))
            }
            0xdd => {
                let n = reader.u32().map_err(|_| truncated(reader))?;
                Ok(Self::scalar(TokenKind::ArrayHeader(n), start, reader))
            }
            // map16, map32
            0xde => {
                let n = reader.u16().map_err(|_| truncated(reader))?;
                Ok(Self::scalar(TokenKind::MapHeader(n as u32), start, reader))
            }
            0xdf => {
                let n = reader.u32().map_err(|_| truncated(reader))?;
                Ok(Self::scalar(TokenKind::MapHeader(n), start, reader))
            }
            // 0xc1 and the ext family are not part of the document format.
            _ => Err(DocumentError::UnexpectedToken {
                byte,
                offset: start,
            }),
        }
    }

    fn scalar(kind: TokenKind, start: usize, reader: &Reader<'_>) -> Token {
        let span = Span::new(start, reader.pos() - start);
        Token {
            kind,
            span,
            value_span: span,
        }
    }

    fn payload(
        kind: TokenKind,
        size: usize,
        start: usize,
        reader: &mut Reader<'_>,
    ) -> Result<Token, DocumentError> {
        let value_offset = reader.pos();
        reader.skip(size).map_err(|_| truncated(reader))?;
        Ok(Token {
            kind,
            span: Span::new(start, reader.pos() - start),
            value_span: Span::new(value_offset, size),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packpath_buffers::BufferView;

    fn read(data: &[u8]) -> Result<Token, DocumentError> {
        let mut reader = Reader::new(BufferView::new(data));
        TokenReader::read_token(&mut reader)
    }

    #[test]
    fn test_nil_and_bool() {
        assert_eq!(read(&[0xc0]).unwrap().kind, TokenKind::Nil);
        assert_eq!(read(&[0xc2]).unwrap().kind, TokenKind::Bool(false));
        assert_eq!(read(&[0xc3]).unwrap().kind, TokenKind::Bool(true));
    }

    #[test]
    fn test_fixints() {
        assert_eq!(read(&[0x00]).unwrap().kind, TokenKind::Int(0));
        assert_eq!(read(&[0x7f]).unwrap().kind, TokenKind::Int(127));
        assert_eq!(read(&[0xff]).unwrap().kind, TokenKind::Int(-1));
        assert_eq!(read(&[0xe0]).unwrap().kind, TokenKind::Int(-32));
    }

    #[test]
    fn test_sized_ints() {
        assert_eq!(read(&[0xcc, 0xff]).unwrap().kind, TokenKind::Int(255));
        assert_eq!(
            read(&[0xcd, 0x01, 0x00]).unwrap().kind,
            TokenKind::Int(256)
        );
        assert_eq!(read(&[0xd0, 0x80]).unwrap().kind, TokenKind::Int(-128));
        let token = read(&[0xd3, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe]).unwrap();
        assert_eq!(token.kind, TokenKind::Int(-2));
        assert_eq!(token.span, Span::new(0, 9));
    }

    #[test]
    fn test_float64() {
        let mut data = vec![0xcb];
        data.extend_from_slice(&1.5f64.to_be_bytes());
        let token = read(&data).unwrap();
        assert_eq!(token.kind, TokenKind::Float(1.5));
        assert_eq!(token.span.len, 9);
    }

    #[test]
    fn test_fixstr_spans() {
        let token = read(&[0xa3, b'f', b'o', b'o']).unwrap();
        assert_eq!(token.kind, TokenKind::Str);
        assert_eq!(token.span, Span::new(0, 4));
        assert_eq!(token.value_span, Span::new(1, 3));
    }

    #[test]
    fn test_str8_spans() {
        let token = read(&[0xd9, 0x02, b'h', b'i']).unwrap();
        assert_eq!(token.span, Span::new(0, 4));
        assert_eq!(token.value_span, Span::new(2, 2));
    }

    #[test]
    fn test_bin8() {
        let token = read(&[0xc4, 0x03, 1, 2, 3]).unwrap();
        assert_eq!(token.kind, TokenKind::Bin);
        assert_eq!(token.value_span, Span::new(2, 3));
    }

    #[test]
    fn test_container_headers() {
        let token = read(&[0x82, 0xa1, b'a', 0x01, 0xa1, b'b', 0x02]).unwrap();
        assert_eq!(token.kind, TokenKind::MapHeader(2));
        assert_eq!(token.span, Span::new(0, 1));

        let token = read(&[0xdc, 0x00, 0x10]).unwrap();
        assert_eq!(token.kind, TokenKind::ArrayHeader(16));
        assert_eq!(token.span, Span::new(0, 3));
    }

    #[test]
    fn test_unexpected_byte() {
        assert_eq!(
            read(&[0xc1]),
            Err(DocumentError::UnexpectedToken {
                byte: 0xc1,
                offset: 0
            })
        );
        assert_eq!(
            read(&[0xd4, 0x00, 0x00]),
            Err(DocumentError::UnexpectedToken {
                byte: 0xd4,
                offset: 0
            })
        );
    }

    #[test]
    fn test_truncated_payload() {
        assert_eq!(
            read(&[0xa5, b'a', b'b']),
            Err(DocumentError::Truncated { offset: 1 })
        );
        assert_eq!(read(&[]), Err(DocumentError::Truncated { offset: 0 }));
    }
}
