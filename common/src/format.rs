//! 日付・数値テキストの整形
//!
//! 撮影日の正規化と表示用変換、LaTeX出力向けの数値整形・エスケープを提供する。
//!
//! 撮影日は次の3種類の粒度を受け付ける:
//! - 年のみ (`2024`)
//! - 年月 (`2024-3`, `2024/03`)
//! - 年月日 (`2024-3-5`, `2024/03/05`)

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};

/// 撮影日が未入力のときの表示
pub const EMPTY_DATE_PLACEHOLDER: &str = "ー";

/// LaTeX出力で値が空のときの表示
pub const EMPTY_VALUE_PLACEHOLDER: &str = "-";

lazy_static::lazy_static! {
    static ref YEAR_RE: Regex = Regex::new(r"^([0-9]{4})$").unwrap();
    static ref YEAR_MONTH_RE: Regex = Regex::new(r"^([0-9]{4})[-/]([0-9]{1,2})$").unwrap();
    static ref FULL_DATE_RE: Regex =
        Regex::new(r"^([0-9]{4})[-/]([0-9]{1,2})[-/]([0-9]{1,2})$").unwrap();
    static ref NUMERIC_RE: Regex = Regex::new(r"^[-+]?[0-9]+(?:\.[0-9]+)?$").unwrap();
    static ref NUMBER_RE: Regex = Regex::new(r"[0-9]+(?:\.[0-9]+)?").unwrap();
}

/// 粒度付きで分解した日付
struct DateParts<'a> {
    year: &'a str,
    month: Option<&'a str>,
    day: Option<&'a str>,
}

impl DateParts<'_> {
    fn join(&self, separator: char) -> String {
        let mut out = self.year.to_string();
        if let Some(month) = self.month {
            out.push(separator);
            out.push_str(&format!("{:0>2}", month));
        }
        if let Some(day) = self.day {
            out.push(separator);
            out.push_str(&format!("{:0>2}", day));
        }
        out
    }
}

fn match_granular(value: &str) -> Option<DateParts<'_>> {
    if let Some(caps) = YEAR_RE.captures(value) {
        return Some(DateParts {
            year: caps.get(1)?.as_str(),
            month: None,
            day: None,
        });
    }
    if let Some(caps) = YEAR_MONTH_RE.captures(value) {
        return Some(DateParts {
            year: caps.get(1)?.as_str(),
            month: Some(caps.get(2)?.as_str()),
            day: None,
        });
    }
    if let Some(caps) = FULL_DATE_RE.captures(value) {
        return Some(DateParts {
            year: caps.get(1)?.as_str(),
            month: Some(caps.get(2)?.as_str()),
            day: Some(caps.get(3)?.as_str()),
        });
    }
    None
}

/// 粒度パターンに合わない日付文字列を汎用的に解釈する
///
/// タイムゾーン付きの値はローカル時刻の日付に変換する。
fn parse_generic_date(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local).date_naive());
    }

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
        // EXIF DateTimeOriginal
        "%Y:%m:%d %H:%M:%S",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }

    const DATE_FORMATS: &[&str] = &["%Y.%m.%d", "%Y年%m月%d日", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }

    None
}

/// 撮影日を保存用の正規形に変換
///
/// 区切りを `-` に統一し、月日をゼロ埋めする。
/// 粒度パターンに合わない入力はトリムしてそのまま返す。
///
/// # Examples
/// ```
/// use holo_manager_common::format::normalize_date;
///
/// assert_eq!(normalize_date("2024/3"), "2024-03");
/// assert_eq!(normalize_date("2024/3/5"), "2024-03-05");
/// assert_eq!(normalize_date(""), "");
/// ```
pub fn normalize_date(raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        return String::new();
    }
    match match_granular(value) {
        Some(parts) => parts.join('-'),
        None => value.to_string(),
    }
}

/// 日付入力欄に入れる形式 (`YYYY-MM-DD` 系) に変換
///
/// `normalize_date` と異なり、粒度パターンに合わない値も日付として解釈できれば
/// `YYYY-MM-DD` に揃える。
pub fn to_input_date(raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        return String::new();
    }
    if let Some(parts) = match_granular(value) {
        return parts.join('-');
    }
    match parse_generic_date(value) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => value.to_string(),
    }
}

/// 撮影日を表示用 (`/` 区切り) に変換
///
/// 粒度パターンに合わない場合は汎用的な日付として解釈し `YYYY/MM/DD` にする。
/// 解釈できない場合は入力をそのまま返す。
pub fn format_date_display(raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        return String::new();
    }
    if let Some(parts) = match_granular(value) {
        return parts.join('/');
    }
    match parse_generic_date(value) {
        Some(date) => date.format("%Y/%m/%d").to_string(),
        None => value.to_string(),
    }
}

/// 保存時に固定する撮影日表示
///
/// 撮影日が空なら `ー` を返す。
pub fn shot_display(normalized_shot_at: &str) -> String {
    if normalized_shot_at.is_empty() {
        EMPTY_DATE_PLACEHOLDER.to_string()
    } else {
        format_date_display(normalized_shot_at)
    }
}

/// 整数部に3桁ごとのカンマを入れる
///
/// 小数部と先頭の符号はそのまま残す。
pub fn group_thousands(number: &str) -> String {
    let (int_part, dec_part) = match number.split_once('.') {
        Some((int_part, dec_part)) => (int_part, Some(dec_part)),
        None => (number, None),
    };

    let digits_start = int_part
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(int_part.len());
    let (sign, digits) = int_part.split_at(digits_start);

    let mut grouped = String::with_capacity(number.len() + digits.len() / 3);
    grouped.push_str(sign);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match dec_part {
        Some(dec) if !dec.is_empty() => format!("{}.{}", grouped, dec),
        _ => grouped,
    }
}

/// LaTeXで特別な意味を持つ文字をエスケープ
///
/// 1文字ずつ置換するため、置換で挿入した `{}` が再エスケープされることはない。
/// 改行は空白に置き換える。
pub fn escape_latex(raw: &str) -> String {
    if raw.is_empty() {
        return EMPTY_VALUE_PLACEHOLDER.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '%' | '&' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push(' ');
            }
            '\n' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

/// パラメータ値をLaTeX表に載せる形へ整形
///
/// 桁区切り (`,` / `，`) を除去してから数値部分に3桁区切りを付け直し、
/// 最後にLaTeXエスケープする。数値以外を含むテキストは、含まれる数値だけを整形する。
///
/// # Examples
/// ```
/// use holo_manager_common::format::format_numeric_text;
///
/// assert_eq!(format_numeric_text("1234567"), "1,234,567");
/// assert_eq!(format_numeric_text("100x200_mm"), "100x200\\_mm");
/// assert_eq!(format_numeric_text(""), "-");
/// ```
pub fn format_numeric_text(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return EMPTY_VALUE_PLACEHOLDER.to_string();
    }

    let cleaned: String = trimmed.chars().filter(|c| *c != ',' && *c != '，').collect();
    if NUMERIC_RE.is_match(&cleaned) {
        return escape_latex(&group_thousands(&cleaned));
    }

    let replaced = NUMBER_RE.replace_all(&cleaned, |caps: &Captures| group_thousands(&caps[0]));
    escape_latex(&replaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_date_granularities() {
        assert_eq!(normalize_date("2024"), "2024");
        assert_eq!(normalize_date("2024/3"), "2024-03");
        assert_eq!(normalize_date("2024-12"), "2024-12");
        assert_eq!(normalize_date("2024/3/5"), "2024-03-05");
        assert_eq!(normalize_date(" 2024-03-05 "), "2024-03-05");
    }

    #[test]
    fn test_normalize_date_passthrough() {
        assert_eq!(normalize_date(""), "");
        assert_eq!(normalize_date("   "), "");
        assert_eq!(normalize_date("去年の夏"), "去年の夏");
        assert_eq!(normalize_date("2024.03.05"), "2024.03.05");
    }

    #[test]
    fn test_format_date_display_granularities() {
        assert_eq!(format_date_display("2024"), "2024");
        assert_eq!(format_date_display("2024-03"), "2024/03");
        assert_eq!(format_date_display("2024-3-5"), "2024/03/05");
    }

    #[test]
    fn test_format_date_display_generic_fallback() {
        assert_eq!(format_date_display("2024-03-05T10:20:30"), "2024/03/05");
        assert_eq!(format_date_display("2024:03:05 10:20:30"), "2024/03/05");
        assert_eq!(format_date_display("2024.3.5"), "2024/03/05");
        assert_eq!(format_date_display("2024年3月5日"), "2024/03/05");
    }

    #[test]
    fn test_format_date_display_unparseable() {
        assert_eq!(format_date_display(""), "");
        assert_eq!(format_date_display("不明"), "不明");
    }

    #[test]
    fn test_to_input_date() {
        assert_eq!(to_input_date("2024/3"), "2024-03");
        assert_eq!(to_input_date("2024.3.5"), "2024-03-05");
        assert_eq!(to_input_date("不明"), "不明");
        assert_eq!(to_input_date(""), "");
    }

    #[test]
    fn test_shot_display_placeholder() {
        assert_eq!(shot_display(""), "ー");
        assert_eq!(shot_display("2024-03"), "2024/03");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("1234567.891"), "1,234,567.891");
        assert_eq!(group_thousands("-1234"), "-1,234");
        assert_eq!(group_thousands("+123456"), "+123,456");
    }

    #[test]
    fn test_escape_latex() {
        assert_eq!(escape_latex(""), "-");
        assert_eq!(escape_latex("50%"), "50\\%");
        assert_eq!(escape_latex("a_b & c"), "a\\_b \\& c");
        assert_eq!(escape_latex("{x}"), "\\{x\\}");
        assert_eq!(escape_latex("\\"), "\\textbackslash{}");
        assert_eq!(escape_latex("~^"), "\\textasciitilde{}\\textasciicircum{}");
        assert_eq!(escape_latex("a\r\nb\nc"), "a b c");
        assert_eq!(escape_latex("$#"), "\\$\\#");
    }

    #[test]
    fn test_format_numeric_text_numbers() {
        assert_eq!(format_numeric_text("1920"), "1,920");
        assert_eq!(format_numeric_text("1,920"), "1,920");
        assert_eq!(format_numeric_text("１２"), "１２");
        assert_eq!(format_numeric_text("10，000"), "10,000");
        assert_eq!(format_numeric_text("0.35"), "0.35");
        assert_eq!(format_numeric_text("-12345.5"), "-12,345.5");
    }

    #[test]
    fn test_format_numeric_text_mixed() {
        assert_eq!(format_numeric_text("1920x1080"), "1,920x1,080");
        assert_eq!(format_numeric_text("100 x 100 mm"), "100 x 100 mm");
        assert_eq!(format_numeric_text("約 12000 点"), "約 12,000 点");
        assert_eq!(format_numeric_text("  "), "-");
    }
}
