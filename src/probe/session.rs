use std::io::{self, Read, Write};

use super::{ProbeError, ProbeStage, SmtpReply};

/// Longest reply line accepted before the server is considered misbehaving.
const MAX_REPLY_LINE: usize = 4096;

/// Line-oriented SMTP client over any byte stream. Owns the stream, so the
/// connection is released when the session goes out of scope.
pub(crate) struct SmtpSession<S> {
    host: String,
    stream: S,
    buffer: Vec<u8>,
}

impl<S: Read + Write> SmtpSession<S> {
    pub(crate) fn new(host: impl Into<String>, stream: S) -> Self {
        Self {
            host: host.into(),
            stream,
            buffer: Vec::new(),
        }
    }

    /// Reads the banner; anything but a 2xx greeting is a refusal.
    pub(crate) fn read_banner(&mut self) -> Result<SmtpReply, ProbeError> {
        let reply = self.read_reply()?;
        tracing::debug!(host = %self.host, code = reply.code, "S: banner");
        expect_positive(ProbeStage::Greeting, reply)
    }

    /// `EHLO`, falling back to `HELO` for servers that refuse the extended form.
    pub(crate) fn hello(&mut self, identity: &str) -> Result<SmtpReply, ProbeError> {
        let reply = self.command(&format!("EHLO {identity}"))?;
        if reply.is_positive_completion() {
            return Ok(reply);
        }
        let reply = self.command(&format!("HELO {identity}"))?;
        expect_positive(ProbeStage::Greeting, reply)
    }

    pub(crate) fn mail_from(&mut self, sender: &str) -> Result<SmtpReply, ProbeError> {
        let reply = self.command(&format!("MAIL FROM:<{sender}>"))?;
        expect_positive(ProbeStage::MailFrom, reply)
    }

    /// Unlike the other stages a negative reply is a verdict, not an error.
    pub(crate) fn rcpt_to(&mut self, recipient: &str) -> Result<SmtpReply, ProbeError> {
        self.command(&format!("RCPT TO:<{recipient}>"))
    }

    /// Best effort; the reply is not awaited.
    pub(crate) fn quit(&mut self) {
        if let Err(err) = self.send_line("QUIT") {
            tracing::debug!(host = %self.host, error = %err, "QUIT not delivered");
        }
    }

    fn command(&mut self, command: &str) -> Result<SmtpReply, ProbeError> {
        self.send_line(command)?;
        let reply = self.read_reply()?;
        tracing::debug!(host = %self.host, command, code = reply.code, "C/S exchange");
        Ok(reply)
    }

    fn send_line(&mut self, command: &str) -> Result<(), ProbeError> {
        if command.contains(['\r', '\n']) {
            return Err(ProbeError::Protocol(format!(
                "line break in SMTP command argument: {command:?}"
            )));
        }
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        self.stream.write_all(&line).map_err(ProbeError::io)?;
        self.stream.flush().map_err(ProbeError::io)
    }

    pub(crate) fn read_reply(&mut self) -> Result<SmtpReply, ProbeError> {
        let mut code = None;
        let mut message_lines = Vec::new();
        loop {
            let raw = self.read_line()?;
            let Some(code_part) = raw.get(..3) else {
                return Err(ProbeError::Protocol(format!("invalid SMTP reply: '{raw}'")));
            };
            let parsed_code = code_part.parse::<u16>().map_err(|_| {
                ProbeError::Protocol(format!("invalid SMTP status code: '{code_part}'"))
            })?;
            match code {
                Some(existing) if existing != parsed_code => {
                    return Err(ProbeError::Protocol(format!(
                        "inconsistent SMTP reply codes: {existing} vs {parsed_code}"
                    )));
                }
                Some(_) => {}
                None => code = Some(parsed_code),
            }
            let continuation = raw.as_bytes().get(3).copied() == Some(b'-');
            let text = raw.get(4..).unwrap_or("").to_string();
            message_lines.push(text);
            if !continuation {
                break;
            }
        }
        let code = code.ok_or_else(|| ProbeError::Protocol("SMTP reply missing status code".into()))?;
        Ok(SmtpReply {
            code,
            message: message_lines.join("\n"),
        })
    }

    fn read_line(&mut self) -> Result<String, ProbeError> {
        let mut scanned = 0;
        loop {
            let newline = self.buffer[scanned..].iter().position(|byte| *byte == b'\n');
            if let Some(offset) = newline {
                let pos = scanned + offset;
                if pos > MAX_REPLY_LINE {
                    return Err(line_too_long());
                }
                let mut line = self.buffer.drain(..=pos).collect::<Vec<_>>();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return String::from_utf8(line)
                    .map_err(|err| ProbeError::Protocol(format!("utf8 error: {err}")));
            }
            if self.buffer.len() > MAX_REPLY_LINE {
                return Err(line_too_long());
            }
            scanned = self.buffer.len();

            let mut chunk = [0u8; 512];
            let read = self.stream.read(&mut chunk).map_err(ProbeError::io)?;
            if read == 0 {
                return Err(ProbeError::io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed while reading reply",
                )));
            }
            self.buffer.extend_from_slice(&chunk[..read]);
        }
    }
}

fn line_too_long() -> ProbeError {
    ProbeError::Protocol(format!("SMTP reply line exceeds {MAX_REPLY_LINE} bytes"))
}

fn expect_positive(stage: ProbeStage, reply: SmtpReply) -> Result<SmtpReply, ProbeError> {
    if reply.is_positive_completion() {
        Ok(reply)
    } else {
        Err(ProbeError::Refused {
            stage,
            code: reply.code,
            message: reply.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct Duplex {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn session(input: &str) -> SmtpSession<Duplex> {
        SmtpSession::new(
            "mx.test",
            Duplex {
                input: Cursor::new(input.as_bytes().to_vec()),
                output: Vec::new(),
            },
        )
    }

    #[test]
    fn multiline_reply_joined() {
        let mut s = session("250-mx.test greets you\r\n250-SIZE 1000\r\n250 8BITMIME\r\n");
        let reply = s.read_reply().expect("reply");
        assert_eq!(reply.code, 250);
        assert_eq!(reply.message, "mx.test greets you\nSIZE 1000\n8BITMIME");
    }

    #[test]
    fn inconsistent_codes_rejected() {
        let mut s = session("250-first\r\n251 second\r\n");
        let err = s.read_reply().expect_err("must fail");
        assert!(matches!(err, ProbeError::Protocol(_)));
    }

    #[test]
    fn eof_is_io_error() {
        let mut s = session("220 partial");
        let err = s.read_reply().expect_err("must fail");
        assert!(matches!(err, ProbeError::Io { .. }));
    }

    #[test]
    fn bare_code_has_empty_message() {
        let mut s = session("250\n");
        let reply = s.read_reply().expect("reply");
        assert_eq!(reply.code, 250);
        assert_eq!(reply.message, "");
    }

    #[test]
    fn ehlo_refused_falls_back_to_helo() {
        let mut s = session("502 not implemented\r\n250 hello\r\n");
        let reply = s.hello("example.com").expect("helo accepted");
        assert_eq!(reply.message, "hello");
        let sent = String::from_utf8(s.stream.output.clone()).expect("utf8");
        assert_eq!(sent, "EHLO example.com\r\nHELO example.com\r\n");
    }

    #[test]
    fn mail_from_refusal_is_error() {
        let mut s = session("553 sender rejected\r\n");
        let err = s.mail_from("test@example.com").expect_err("refused");
        match err {
            ProbeError::Refused { stage, code, .. } => {
                assert_eq!(stage, ProbeStage::MailFrom);
                assert_eq!(code, 553);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// Serves `A` forever and counts what it handed out.
    struct Endless {
        served: usize,
    }

    impl Read for Endless {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            buf.fill(b'A');
            self.served += buf.len();
            Ok(buf.len())
        }
    }

    impl Write for Endless {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn unterminated_reply_line_is_capped() {
        let mut s = SmtpSession::new("mx.test", Endless { served: 0 });
        let err = s.read_reply().expect_err("must fail");
        assert!(matches!(err, ProbeError::Protocol(_)));
        assert!(s.stream.served <= MAX_REPLY_LINE + 512);
    }

    #[test]
    fn oversized_terminated_line_is_rejected() {
        let long = format!("250 {}\r\n", "x".repeat(MAX_REPLY_LINE));
        let mut s = session(&long);
        let err = s.read_reply().expect_err("must fail");
        assert!(matches!(err, ProbeError::Protocol(_)));
    }

    #[test]
    fn line_breaks_in_arguments_never_reach_the_wire() {
        let mut s = session("250 ok\r\n");
        let err = s.rcpt_to("user@example.com>\r\nRSET").expect_err("must fail");
        assert!(matches!(err, ProbeError::Protocol(_)));
        let err = s.hello("example.com\nNOOP").expect_err("must fail");
        assert!(matches!(err, ProbeError::Protocol(_)));
        assert!(s.stream.output.is_empty());
    }
}
