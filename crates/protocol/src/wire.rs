//! Wire-Format fuer TCP-Verbindungen
//!
//! Zeilenbasiertes Protokoll: ein JSON-Objekt pro Zeile, abgeschlossen mit
//! `\n` (ein vorangehendes `\r` wird toleriert). Leere Zeilen werden
//! uebersprungen.
//!
//! Der Decoder liefert die rohen Bytes der Zeile (auch ungueltiges UTF-8),
//! damit der Server Parse-Fehler pro Request beantworten kann, ohne die
//! Verbindung zu verlieren. Nur eine zu lange Zeile ist fatal.

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ProtokollError;

/// Standard-Limit fuer eine Zeile (8 KB)
pub const DEFAULT_MAX_ZEILE: usize = 8 * 1024;

/// tokio-util Codec fuer newline-getrennte JSON-Envelopes
///
/// ```rust,no_run
/// use tokio_util::codec::Framed;
/// use callcenter_protocol::EnvelopeCodec;
///
/// // let stream = TcpStream::connect(...).await?;
/// // let framed = Framed::new(stream, EnvelopeCodec::new());
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeCodec {
    max_zeile: usize,
    /// Bis hierhin wurde der Buffer bereits erfolglos nach `\n` durchsucht
    gesucht_bis: usize,
}

impl EnvelopeCodec {
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_ZEILE)
    }

    /// Codec mit eigenem Zeilenlimit (ohne Zeilenende gezaehlt)
    pub fn with_max_size(max_zeile: usize) -> Self {
        Self {
            max_zeile,
            gesucht_bis: 0,
        }
    }
}

impl Default for EnvelopeCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for EnvelopeCodec {
    type Item = Bytes;
    type Error = ProtokollError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some(offset) = src[self.gesucht_bis..].iter().position(|b| *b == b'\n') else {
                if src.len() > self.max_zeile {
                    return Err(ProtokollError::ZeileZuLang(self.max_zeile));
                }
                self.gesucht_bis = src.len();
                return Ok(None);
            };

            let ende = self.gesucht_bis + offset;
            self.gesucht_bis = 0;

            let mut zeile = src.split_to(ende + 1);
            zeile.truncate(ende);
            if zeile.last() == Some(&b'\r') {
                zeile.truncate(ende - 1);
            }
            if zeile.len() > self.max_zeile {
                return Err(ProtokollError::ZeileZuLang(self.max_zeile));
            }

            if zeile.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Ok(Some(zeile.freeze()));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(zeile) = self.decode(src)? {
            return Ok(Some(zeile));
        }
        // Letzte Zeile ohne abschliessendes `\n`
        if src.is_empty() {
            return Ok(None);
        }
        src.put_u8(b'\n');
        self.decode(src)
    }
}

impl<T: Serialize> Encoder<T> for EnvelopeCodec {
    type Error = ProtokollError;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = serde_json::to_vec(&item)?;
        dst.reserve(json.len() + 1);
        dst.put_slice(&json);
        dst.put_u8(b'\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{SinkExt, StreamExt};
    use tokio::io::{AsyncWriteExt, AsyncReadExt};
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;
    use crate::envelope::{Request, Response};

    fn naechste(codec: &mut EnvelopeCodec, buf: &mut BytesMut) -> Option<String> {
        codec
            .decode(buf)
            .unwrap()
            .map(|z| String::from_utf8(z.to_vec()).unwrap())
    }

    #[test]
    fn zeile_in_stuecken() {
        let mut codec = EnvelopeCodec::new();
        let mut buf = BytesMut::from(&b"{\"command\":"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"\"call\",\"id\":\"1\"}\r\n{\"x\"");
        assert_eq!(
            naechste(&mut codec, &mut buf).as_deref(),
            Some(r#"{"command":"call","id":"1"}"#)
        );
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(&buf[..], b"{\"x\"");
    }

    #[test]
    fn leere_zeilen_werden_uebersprungen() {
        let mut codec = EnvelopeCodec::new();
        let mut buf = BytesMut::from(&b"\n  \r\n{}\n"[..]);
        assert_eq!(naechste(&mut codec, &mut buf).as_deref(), Some("{}"));
        assert!(buf.is_empty());
    }

    #[test]
    fn ungueltiges_utf8_wird_unveraendert_geliefert() {
        let mut codec = EnvelopeCodec::new();
        let mut buf = BytesMut::from(&b"\xff\xfe\n{}\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some(&b"\xff\xfe"[..]));
        assert_eq!(naechste(&mut codec, &mut buf).as_deref(), Some("{}"));
    }

    #[test]
    fn zu_lange_zeile_ohne_ende() {
        let mut codec = EnvelopeCodec::with_max_size(8);
        let mut buf = BytesMut::from(&b"0123456789"[..]);
        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(err, ProtokollError::ZeileZuLang(8)));
    }

    #[test]
    fn zu_lange_zeile_mit_ende() {
        let mut codec = EnvelopeCodec::with_max_size(4);
        let mut buf = BytesMut::from(&b"abcdef\n"[..]);
        assert!(codec.decode(&mut buf).is_err());
    }

    #[test]
    fn letzte_zeile_ohne_newline() {
        let mut codec = EnvelopeCodec::new();
        let mut buf = BytesMut::from(&b"{\"a\":1}"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(
            codec.decode_eof(&mut buf).unwrap().as_deref(),
            Some(&br#"{"a":1}"#[..])
        );
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn encoder_schreibt_json_zeile() {
        let mut codec = EnvelopeCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(Response::fehler("x"), &mut buf).unwrap();
        assert_eq!(&buf[..], b"{\"error\":\"x\"}\n");
    }

    #[tokio::test]
    async fn framed_ueber_duplex() {
        let (client, server) = tokio::io::duplex(1024);
        let (mut server_lesen, mut server_schreiben) = tokio::io::split(server);

        let mut sink = FramedWrite::new(client, EnvelopeCodec::new());
        sink.send(Request {
            command: "call".into(),
            id: "1".into(),
        })
        .await
        .unwrap();

        let mut rohe = vec![0u8; 64];
        let n = server_lesen.read(&mut rohe).await.unwrap();
        assert_eq!(&rohe[..n], b"{\"command\":\"call\",\"id\":\"1\"}\n");

        server_schreiben
            .write_all(b"{\"response\":\"\"}\n")
            .await
            .unwrap();
        drop(server_schreiben);

        let (client_lesen, _) = tokio::io::split(sink.into_inner());
        let mut stream = FramedRead::new(client_lesen, EnvelopeCodec::new());
        let zeile = stream.next().await.unwrap().unwrap();
        assert_eq!(&zeile[..], br#"{"response":""}"#);
    }
}
