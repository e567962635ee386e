//! Scans a possibly scoped, possibly templated C++ identifier.
//!
//! Grounded on `vtkParse_NameLength`: the lexer never validates that the
//! identifier names anything real, it just finds where one *would* end.

/// Returns the byte length of the scoped/templated identifier starting at
/// `text`, or `0` if `text` does not begin with one.
///
/// Accepts a leading `::`, then an identifier character, then any run of
/// identifier characters, `::`, or a balanced `<...>` block. Template
/// brackets may nest; a depth mismatch or end of input inside `<...>`
/// simply stops the scan at that point rather than erroring.
#[must_use]
pub fn name_length(text: &str) -> usize {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut i = 0usize;

    let starts_name = |i: usize| -> bool {
        matches!(bytes.get(i), Some(b) if b.is_ascii_alphabetic() || *b == b'_')
    };

    if !(starts_name(i) || (bytes.get(i) == Some(&b':') && bytes.get(i + 1) == Some(&b':'))) {
        return 0;
    }

    if bytes.get(i) == Some(&b':') {
        i += 1;
    }
    i += 1;

    loop {
        let cont = matches!(bytes.get(i), Some(b) if b.is_ascii_alphanumeric() || *b == b'_')
            || (bytes.get(i) == Some(&b':') && bytes.get(i + 1) == Some(&b':'))
            || bytes.get(i) == Some(&b'<');
        if !cont {
            break;
        }

        if bytes.get(i) == Some(&b'<') {
            let mut depth: i32 = 0;
            while i < len && bytes[i] != b'\n' {
                if bytes[i] == b'<' {
                    depth += 1;
                } else if bytes[i] == b'>' {
                    depth -= 1;
                    if depth == 0 {
                        i += 1;
                        break;
                    }
                }
                i += 1;
            }
            if i >= len || bytes[i - 1] == b'\n' {
                break;
            }
        }

        if bytes.get(i) == Some(&b':') {
            i += 1;
        }
        i += 1;
    }

    i.min(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identifier() {
        assert_eq!(name_length("vtkObject rest"), 9);
    }

    #[test]
    fn scoped_identifier() {
        assert_eq!(name_length("std::string rest"), 11);
    }

    #[test]
    fn leading_scope() {
        assert_eq!(name_length("::vtkObject"), 11);
    }

    #[test]
    fn templated_identifier() {
        assert_eq!(name_length("A::B<C, D<E>>::F more"), 16);
    }

    #[test]
    fn not_an_identifier() {
        assert_eq!(name_length("123abc"), 0);
        assert_eq!(name_length(""), 0);
    }

    #[test]
    fn stops_at_unbalanced_bracket() {
        // depth never returns to zero before end of line: scan stops there
        let n = name_length("Foo<Bar\nrest");
        assert!(n <= "Foo<Bar".len() || n == 0);
    }
}
