// "label: [v0, v1, ...]" の形で小数点以下 8 桁まで表示する
// num_elements が 0 もしくは長さ以上なら全要素
pub fn format_vector(label: &str, values: &[f64], num_elements: usize) -> String {
    let n = if num_elements == 0 { values.len() } else { num_elements.min(values.len()) };
    let body = values[..n].iter().map(|v| format!("{:.8}", v)).collect::<Vec<_>>().join(", ");
    format!("{}: [{}]", label, body)
}

#[test]
fn test_format_vector_prefix() {
    assert_eq!(format_vector("x1", &[1.0, 2.5, 3.0], 2), "x1: [1.00000000, 2.50000000]");
}

#[test]
fn test_format_vector_all() {
    assert_eq!(format_vector("x", &[0.5, -1.0], 0), "x: [0.50000000, -1.00000000]");
    assert_eq!(format_vector("x", &[0.5], 10), "x: [0.50000000]");
    assert_eq!(format_vector("x", &[], 0), "x: []");
}
