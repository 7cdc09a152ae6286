//! Shared fixtures for integration tests

use std::fmt::Write as _;
use std::path::Path;

const HEADER: &str = "sl_no,gender,ssc_p,ssc_b,hsc_p,hsc_b,hsc_s,degree_p,degree_t,workex,etest_p,specialisation,mba_p,status,salary";

/// Raw placement CSV using the dataset's raw spellings.
///
/// Placement follows secondary score plus work experience; every 7th row has
/// no `mba_p` and placed rows carry a salary.
pub fn placement_csv(n: usize) -> String {
    let genders = ["M", "F"];
    let boards = ["Central", "Others", "Central Board"];
    let streams = ["Science", "Commerce", "Arts", "Other"];
    let degrees = ["Sci&Tech", "Comm&Mgmt", "Others"];
    let specs = ["Mkt&HR", "Mkt&Fin"];

    let mut csv = String::from(HEADER);
    csv.push('\n');
    for i in 0..n {
        let ssc_p = 40.0 + ((i * 37) % 55) as f64;
        let workex = if i % 3 == 0 { "Yes" } else { "No" };
        let score = ssc_p + if workex == "Yes" { 10.0 } else { 0.0 };
        let placed = score >= 65.0;
        let mba_p = if i % 7 == 3 {
            String::new()
        } else {
            format!("{:.2}", 52.0 + ((i * 13) % 25) as f64)
        };
        let salary = if placed { format!("{}", 200000 + (i % 10) * 10000) } else { String::new() };

        let _ = writeln!(
            csv,
            "{},{},{:.1},{},{:.1},{},{},{:.1},{},{},{:.1},{},{},{},{}",
            i + 1,
            genders[i % 2],
            ssc_p,
            boards[i % 3],
            50.0 + ((i * 11) % 45) as f64,
            boards[(i + 1) % 3],
            streams[i % 4],
            55.0 + ((i * 7) % 30) as f64,
            degrees[(i / 2) % 3],
            workex,
            50.0 + ((i * 17) % 48) as f64,
            specs[(i / 3) % 2],
            mba_p,
            if placed { "Placed" } else { "Not Placed" },
            salary,
        );
    }
    csv
}

pub fn write_placement_csv(path: &Path, n: usize) {
    std::fs::write(path, placement_csv(n)).unwrap();
}
