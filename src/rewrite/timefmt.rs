//! Date format pattern conversion.
//!
//! Spark and Hive use Java `DateTimeFormatter` letters (`yyyy-MM-dd HH:mm`);
//! Doris and MySQL use `%` specifiers (`%Y-%m-%d %H:%i`).

/// A converted pattern plus the parts that only approximate the original.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub pattern: String,
    pub approximations: Vec<String>,
}

/// Convert a Java pattern to `%` specifiers. The error carries the first
/// pattern letter that has no equivalent.
pub fn java_to_mysql(pattern: &str) -> Result<Converted, String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut approximations = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            // quoted literal text, '' is a single quote
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        out.push('\'');
                        i += 2;
                        continue;
                    }
                    break;
                }
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            push_literal(&mut out, c);
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        // %f is always six digits
        if c == 'S' && run != 6 {
            approximations.push(format!(
                "fraction '{}' ({} digits) printed as microseconds (%f, 6 digits)",
                "S".repeat(run),
                run
            ));
        }
        let spec = match (c, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1) => "%c",
            ('M', 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%M",
            ('d', 1) => "%e",
            ('d', _) => "%d",
            ('H', 1) => "%k",
            ('H', _) => "%H",
            ('h', 1) => "%l",
            ('h', _) => "%h",
            ('m', _) => "%i",
            ('s', _) => "%s",
            ('S', _) => "%f",
            ('a', _) => "%p",
            ('E', 1..=3) => "%a",
            ('E', _) => "%W",
            ('D', _) => "%j",
            _ => return Err(c.to_string().repeat(run)),
        };
        out.push_str(spec);
        i += run;
    }
    Ok(Converted {
        pattern: out,
        approximations,
    })
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

/// Convert `%` specifiers to a Java pattern. Literal letters are quoted.
/// Every specifier has an exact Java counterpart.
pub fn mysql_to_java(pattern: &str) -> Result<Converted, String> {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut literal = String::new();
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }
        let Some(spec) = chars.next() else {
            return Err("%".to_string());
        };
        if spec == '%' {
            literal.push('%');
            continue;
        }
        let java = match spec {
            'Y' => "yyyy",
            'y' => "yy",
            'm' => "MM",
            'c' => "M",
            'b' => "MMM",
            'M' => "MMMM",
            'd' => "dd",
            'e' => "d",
            'H' => "HH",
            'k' => "H",
            'h' | 'I' => "hh",
            'l' => "h",
            'i' => "mm",
            's' | 'S' => "ss",
            'f' => "SSSSSS",
            'p' => "a",
            'a' => "EEE",
            'W' => "EEEE",
            'j' => "DDD",
            'T' => "HH:mm:ss",
            other => return Err(format!("%{}", other)),
        };
        flush_literal(&mut out, &mut literal);
        out.push_str(java);
    }
    flush_literal(&mut out, &mut literal);
    Ok(Converted {
        pattern: out,
        approximations: Vec::new(),
    })
}

/// Emit pending literal text, quoting runs that contain letters or quotes.
fn flush_literal(out: &mut String, literal: &mut String) {
    if literal.is_empty() {
        return;
    }
    if literal.chars().any(|c| c.is_ascii_alphabetic() || c == '\'') {
        out.push('\'');
        out.push_str(&literal.replace('\'', "''"));
        out.push('\'');
    } else {
        out.push_str(literal);
    }
    literal.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn to_mysql(pattern: &str) -> Result<String, String> {
        java_to_mysql(pattern).map(|c| c.pattern)
    }

    fn to_java(pattern: &str) -> Result<String, String> {
        mysql_to_java(pattern).map(|c| c.pattern)
    }

    #[test]
    fn test_common_patterns() {
        assert_eq!(to_mysql("yyyy-MM-dd").unwrap(), "%Y-%m-%d");
        assert_eq!(to_mysql("yyyy-MM-dd HH:mm:ss").unwrap(), "%Y-%m-%d %H:%i:%s");
        assert_eq!(to_mysql("yyyyMMdd").unwrap(), "%Y%m%d");
        assert_eq!(to_mysql("dd/MMM/yy h:mm a").unwrap(), "%d/%b/%y %l:%i %p");
        assert_eq!(to_mysql("EEEE").unwrap(), "%W");
    }

    #[test]
    fn test_fraction_digits() {
        let millis = java_to_mysql("HH:mm:ss.SSS").unwrap();
        assert_eq!(millis.pattern, "%H:%i:%s.%f");
        assert_eq!(millis.approximations.len(), 1);
        assert!(millis.approximations[0].contains("'SSS'"));

        let micros = java_to_mysql("HH:mm:ss.SSSSSS").unwrap();
        assert_eq!(micros.pattern, "%H:%i:%s.%f");
        assert!(micros.approximations.is_empty());

        assert!(mysql_to_java("%s.%f").unwrap().approximations.is_empty());
    }

    #[test]
    fn test_quoted_literals() {
        assert_eq!(to_mysql("yyyy-MM-dd'T'HH:mm").unwrap(), "%Y-%m-%dT%H:%i");
        assert_eq!(to_mysql("HH 'o''clock'").unwrap(), "%H o'clock");
        assert_eq!(to_mysql("'100%'").unwrap(), "100%%");
    }

    #[test]
    fn test_unsupported_letter() {
        assert_eq!(to_mysql("yyyy-ww").unwrap_err(), "ww");
        assert_eq!(to_mysql("XXX").unwrap_err(), "XXX");
    }

    #[test]
    fn test_reverse() {
        assert_eq!(to_java("%Y-%m-%d %H:%i:%s").unwrap(), "yyyy-MM-dd HH:mm:ss");
        assert_eq!(to_java("%Y%m%d").unwrap(), "yyyyMMdd");
        assert_eq!(to_java("%Y-%m-%dT%T").unwrap(), "yyyy-MM-dd'T'HH:mm:ss");
        assert_eq!(to_java("%d%%").unwrap(), "dd%");
    }

    #[test]
    fn test_reverse_unknown_specifier() {
        assert_eq!(to_java("%Y-%U").unwrap_err(), "%U");
        assert_eq!(to_java("50%").unwrap_err(), "%");
    }

    #[test]
    fn test_both_directions_agree() {
        for pattern in ["yyyy-MM-dd", "HH:mm:ss", "yyyy/MM/dd HH:mm", "dd MMM yyyy"] {
            let mysql = to_mysql(pattern).unwrap();
            assert_eq!(to_java(&mysql).unwrap(), pattern);
        }
    }
}
