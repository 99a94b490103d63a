//! Parsing of the balancer's CSV stats export.

/// One backend server row from the stats export, reduced to the fields
/// the monitor uses.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub server_name: String,
    pub status: String,
    pub current_connections: i64,
    pub weight: i64,
}

/// Parses a stats export and returns the server rows of `backend`.
///
/// Columns are located by header name, so the balancer may reorder or
/// add columns between versions. Rows with fewer fields than the
/// header are skipped, as are the FRONTEND/BACKEND aggregate rows.
/// A missing or malformed `scur` defaults to 0 and `weight` to 1.
pub fn parse_export(export: &str, backend: &str) -> Vec<ExportRow> {
    let mut lines = export.lines();
    let Some(header_line) = lines.next() else {
        return Vec::new();
    };

    let headers: Vec<&str> = header_line.split(',').map(str::trim).collect();
    let index_of = |name: &str| headers.iter().position(|h| *h == name);
    let (Some(pxname_idx), Some(svname_idx)) = (index_of("# pxname"), index_of("svname")) else {
        return Vec::new();
    };
    let scur_idx = index_of("scur");
    let status_idx = index_of("status");
    let weight_idx = index_of("weight");

    let mut rows = Vec::new();
    for line in lines {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < headers.len() {
            continue;
        }
        if fields[pxname_idx] != backend {
            continue;
        }
        let server_name = fields[svname_idx];
        if server_name == "FRONTEND" || server_name == "BACKEND" {
            continue;
        }

        let field = |idx: Option<usize>| idx.and_then(|i| fields.get(i).copied());
        rows.push(ExportRow {
            server_name: server_name.to_string(),
            status: field(status_idx).unwrap_or("").to_string(),
            current_connections: field(scur_idx).and_then(|v| v.parse().ok()).unwrap_or(0),
            weight: field(weight_idx).and_then(|v| v.parse().ok()).unwrap_or(1),
        });
    }
    rows
}
