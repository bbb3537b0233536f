use crate::{error::fileio::*, Blueprint, REGMACH_VER};

const IMAGE_DECL: &str = "REGMACHIMAGE";

fn header() -> String {
    format!("{}\n{}\n", IMAGE_DECL, REGMACH_VER)
}

/// Encode a machine blueprint as a header followed by its bincode form
pub fn ser(blueprint: &Blueprint) -> FileIOResult<Vec<u8>> {
    let mut output = header().into_bytes();
    let payload = bincode::serialize(blueprint).map_err(|e| FileIOError::Encode(e.to_string()))?;
    output.extend(payload);
    Ok(output)
}

pub fn de(input: &[u8]) -> FileIOResult<Blueprint> {
    let decl = format!("{}\n", IMAGE_DECL);
    if !input.starts_with(decl.as_bytes()) {
        return Err(FileIOError::MalformedHeader(MalformedHeaderError::ImageDecl));
    }
    let header = header();
    if !input.starts_with(header.as_bytes()) {
        return Err(FileIOError::MalformedHeader(MalformedHeaderError::Version));
    }
    bincode::deserialize(&input[header.len()..])
        .map_err(|e| FileIOError::MalformedPayload(e.to_string()))
}

/// Whether `input` starts like a machine image rather than source text
pub fn is_image(input: &[u8]) -> bool {
    input.starts_with(IMAGE_DECL.as_bytes())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::machine::tests::util::factorial_controller;

    fn factorial() -> Blueprint {
        Blueprint {
            registers: vec!["n".into(), "val".into(), "continue".into()],
            controller: factorial_controller(),
        }
    }

    #[test]
    fn decode() {
        let binary = ser(&factorial()).unwrap();
        assert!(is_image(&binary));
        assert_eq!(de(&binary), Ok(factorial()));
    }

    #[test]
    fn bad_header() {
        assert_eq!(
            de(b"(machine (registers) (controller))"),
            Err(FileIOError::MalformedHeader(MalformedHeaderError::ImageDecl))
        );
        assert_eq!(
            de(b"REGMACHIMAGE\n0.0.0-old\n"),
            Err(FileIOError::MalformedHeader(MalformedHeaderError::Version))
        );
    }

    #[test]
    fn truncated_payload() {
        let binary = ser(&factorial()).unwrap();
        let cut = &binary[..binary.len() - 4];
        assert!(matches!(de(cut), Err(FileIOError::MalformedPayload(_))));
    }
}
