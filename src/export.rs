//! Payslip export.
//!
//! A [`Payslip`] lays out one employee's record and computed pay as labelled
//! lines, top to bottom: employee, rate, hours, deductions, branch, date, then
//! a single gross / taxes / net line. [`Payslip::to_pdf`] renders those lines
//! onto one A4 page.

use rust_decimal::Decimal;

use crate::models::{PayrollBreakdown, WageRecord};

/// MIME type of the rendered document.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

const PAGE_WIDTH: u32 = 595;
const PAGE_HEIGHT: u32 = 842;
const LEFT_MARGIN: u32 = 100;
const FIRST_LINE_Y: u32 = 750;
const LINE_SPACING: u32 = 20;
const FONT_SIZE: u32 = 12;

/// The printable lines of one employee's payslip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payslip {
    name: String,
    lines: Vec<String>,
}

impl Payslip {
    /// Lays out the payslip for `record` and its `breakdown`.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_ledger::calculation::calculate_payroll;
    /// use payroll_ledger::export::Payslip;
    /// use payroll_ledger::models::WageRecord;
    ///
    /// let record = WageRecord::parse("alice", "20", "45", "50", "north", "p1").unwrap();
    /// let payslip = Payslip::new(&record, &calculate_payroll(&record));
    ///
    /// assert_eq!(payslip.lines()[0], "Employee: alice");
    /// assert_eq!(payslip.lines()[6], "Gross: $950.00    Taxes: $237.50    Net: $662.50");
    /// ```
    pub fn new(record: &WageRecord, breakdown: &PayrollBreakdown) -> Self {
        let lines = vec![
            format!("Employee: {}", record.name),
            format!("Rate: {}", money(record.rate)),
            format!("Hours: {}", record.hours.normalize()),
            format!("Deductions: {}", money(record.deductions)),
            format!("Branch: {}", record.branch),
            format!("Date: {}", record.date),
            format!(
                "Gross: {}    Taxes: {}    Net: {}",
                money(breakdown.gross),
                money(breakdown.taxes),
                money(breakdown.net)
            ),
        ];

        Self {
            name: record.name.clone(),
            lines,
        }
    }

    /// The labelled lines, in print order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The suggested download file name, `<employee>.pdf`.
    ///
    /// Characters that are unsafe in a `Content-Disposition` header are
    /// replaced with `_`.
    pub fn file_name(&self) -> String {
        let stem: String = self
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}.pdf", stem)
    }

    /// Renders the payslip as a single-page PDF document.
    pub fn to_pdf(&self) -> Vec<u8> {
        let mut content = format!(
            "BT\n/F1 {} Tf\n{} TL\n{} {} Td\n",
            FONT_SIZE, LINE_SPACING, LEFT_MARGIN, FIRST_LINE_Y
        );
        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 {
                content.push_str("T*\n");
            }
            content.push_str(&format!("({}) Tj\n", escape_pdf_text(line)));
        }
        content.push_str("ET\n");

        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>",
                PAGE_WIDTH, PAGE_HEIGHT
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{}endstream",
                content.len(),
                content
            ),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (index, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", index + 1, body).as_bytes());
        }

        let xref_offset = pdf.len();
        let mut trailer = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            trailer.push_str(&format!("{:010} 00000 n \n", offset));
        }
        trailer.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        ));
        pdf.extend_from_slice(trailer.as_bytes());
        pdf
    }
}

/// Formats an amount exactly as the ledger holds it.
///
/// Whole and two-place amounts are padded to cents; anything finer keeps
/// every significant digit, so a payslip always agrees with the report.
fn money(amount: Decimal) -> String {
    let exact = amount.normalize().abs();
    let digits = if exact.scale() <= 2 {
        format!("{:.2}", exact)
    } else {
        exact.to_string()
    };

    if amount.is_sign_negative() && !amount.is_zero() {
        format!("-${}", digits)
    } else {
        format!("${}", digits)
    }
}

/// Escapes a line for a PDF literal string; non-ASCII characters become `?`.
fn escape_pdf_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                escaped.push('\\');
                escaped.push(c);
            }
            ' '..='~' => escaped.push(c),
            _ => escaped.push('?'),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::calculate_payroll;

    fn payslip_for(name: &str, rate: &str, hours: &str, deductions: &str) -> Payslip {
        let record = WageRecord::parse(name, rate, hours, deductions, "north", "2024-01").unwrap();
        Payslip::new(&record, &calculate_payroll(&record))
    }

    #[test]
    fn test_lines_in_fixed_order() {
        let payslip = payslip_for("alice", "20", "45", "50");

        assert_eq!(
            payslip.lines(),
            &[
                "Employee: alice",
                "Rate: $20.00",
                "Hours: 45",
                "Deductions: $50.00",
                "Branch: north",
                "Date: 2024-01",
                "Gross: $950.00    Taxes: $237.50    Net: $662.50",
            ]
        );
    }

    #[test]
    fn test_short_week_payslip() {
        let payslip = payslip_for("bob", "15", "30", "0");
        assert_eq!(
            payslip.lines()[6],
            "Gross: $600.00    Taxes: $150.00    Net: $450.00"
        );
    }

    #[test]
    fn test_negative_amounts_are_signed() {
        let payslip = payslip_for("carol", "10", "40", "500");
        // 400 - 100 - 500
        assert!(payslip.lines()[6].ends_with("Net: -$200.00"));
    }

    #[test]
    fn test_sub_cent_amounts_are_not_rounded() {
        // 40 * 5.05859375 = 202.34375 gross, 50.5859375 tax
        let payslip = payslip_for("erin", "5.05859375", "40", "0");
        assert_eq!(payslip.lines()[1], "Rate: $5.05859375");
        assert_eq!(
            payslip.lines()[6],
            "Gross: $202.34375    Taxes: $50.5859375    Net: $151.7578125"
        );
    }

    #[test]
    fn test_money_pads_to_cents() {
        assert_eq!(money(Decimal::from(950)), "$950.00");
        assert_eq!(money(Decimal::new(2375, 1)), "$237.50");
        assert_eq!(money(Decimal::new(20000, 3)), "$20.00");
        assert_eq!(money(Decimal::new(-5, 1)), "-$0.50");
        assert_eq!(money(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn test_fractional_hours_are_not_padded() {
        let payslip = payslip_for("dave", "10", "37.50", "0");
        assert_eq!(payslip.lines()[2], "Hours: 37.5");
    }

    #[test]
    fn test_file_name_is_header_safe() {
        assert_eq!(payslip_for("alice", "1", "1", "0").file_name(), "alice.pdf");
        assert_eq!(
            payslip_for("Zoë \"Z\" O'Neil", "1", "1", "0").file_name(),
            "Zo_ _Z_ O_Neil.pdf"
        );
    }

    #[test]
    fn test_pdf_structure() {
        let pdf = payslip_for("alice", "20", "45", "50").to_pdf();
        let text = String::from_utf8(pdf).unwrap();

        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("(Employee: alice) Tj"));
        assert!(text.contains("(Gross: $950.00    Taxes: $237.50    Net: $662.50) Tj"));
    }

    #[test]
    fn test_pdf_xref_offsets_point_at_objects() {
        let pdf = payslip_for("alice", "20", "45", "50").to_pdf();
        let text = String::from_utf8(pdf).unwrap();

        let startxref = text.rfind("startxref\n").unwrap();
        let xref_offset: usize = text[startxref + "startxref\n".len()..]
            .lines()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert!(text[xref_offset..].starts_with("xref\n0 6\n"));

        let entries: Vec<&str> = text[xref_offset..].lines().skip(3).take(5).collect();
        for (index, entry) in entries.iter().enumerate() {
            let offset: usize = entry[..10].parse().unwrap();
            assert!(
                text[offset..].starts_with(&format!("{} 0 obj", index + 1)),
                "xref entry {} does not point at its object",
                index + 1
            );
        }
    }

    #[test]
    fn test_pdf_escapes_delimiters() {
        let pdf = payslip_for("Smith (Jr) \\ co", "10", "40", "0").to_pdf();
        let text = String::from_utf8(pdf).unwrap();
        assert!(text.contains("(Employee: Smith \\(Jr\\) \\\\ co) Tj"));
    }

    #[test]
    fn test_escape_replaces_non_ascii() {
        assert_eq!(escape_pdf_text("Zoë"), "Zo?");
    }
}
