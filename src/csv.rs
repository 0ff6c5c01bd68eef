// src/csv.rs
use std::io::{self, Write};

pub const SEP: char = ',';

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single row to any writer, quoting cells that need it.
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S], sep: char) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        let cell = cell.as_ref();
        if !first { write!(w, "{sep}")?; } else { first = false; }
        if needs_quotes(cell, sep) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{escaped}\"")?;
        } else {
            write!(w, "{cell}")?;
        }
    }
    writeln!(w)
}

/// Header line followed by every row, in order.
pub fn write_table<W: Write>(mut w: W, headers: &[&str], rows: &[Vec<String>], sep: char) -> io::Result<()> {
    write_row(&mut w, headers, sep)?;
    for r in rows {
        write_row(&mut w, r, sep)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_cells_are_unquoted() {
        let mut buf = Vec::new();
        write_row(&mut buf, &["321", "SP", "18°"], SEP).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "321,SP,18°\n");
    }

    #[test]
    fn separators_quotes_and_newlines_are_quoted() {
        let mut buf = Vec::new();
        write_row(&mut buf, &["a,b", "say \"hi\"", "x\ny", ""], SEP).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "\"a,b\",\"say \"\"hi\"\"\",\"x\ny\",\n");
    }

    #[test]
    fn table_has_header_first() {
        let rows = vec![vec![s!("1"), s!("SP")], vec![s!("2"), s!("RJ")]];
        let mut buf = Vec::new();
        write_table(&mut buf, &["id", "state"], &rows, SEP).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "id,state\n1,SP\n2,RJ\n");

        let mut buf = Vec::new();
        write_table(&mut buf, &["id", "state"], &[], SEP).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "id,state\n");
    }
}
