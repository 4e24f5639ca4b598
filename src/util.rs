use std::fmt::Write;

use glam::Mat4;

/// Multi line dump of a matrix, one column per line, for debug logs.
pub fn format_mat4(name: &str, mat: &Mat4) -> String {
    let mut output = format!("{}:\n", name);
    let columns = [
        ("x_axis", mat.x_axis),
        ("y_axis", mat.y_axis),
        ("z_axis", mat.z_axis),
        ("w_axis", mat.w_axis),
    ];
    for (label, c) in columns {
        let _ = writeln!(
            output,
            "{}: [{:8.3},{:8.3},{:8.3},{:8.3}]",
            label, c.x, c.y, c.z, c.w
        );
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn one_line_per_column() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let s = format_mat4("model", &m);
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "model:");
        assert_eq!(lines[4], "w_axis: [   1.000,   2.000,   3.000,   1.000]");
    }
}
