//! Static resources of the HTML report.

/// Directory of static resources, relative to the report root
pub const RESOURCES_DIR: &str = "jacoco-resources";

/// Stylesheet file name
pub const STYLESHEET: &str = "report.css";

/// Stylesheet shared by every page
pub const REPORT_CSS: &str = r#"body, td {
  font-family: sans-serif;
  font-size: 10pt;
}

h1 {
  font-weight: bold;
  font-size: 18pt;
}

.breadcrumb {
  border: #d6d3ce 1px solid;
  padding: 2px 4px 2px 4px;
}

.breadcrumb .info {
  float: right;
}

.breadcrumb .info a {
  margin-left: 8px;
}

.footer {
  margin-top: 20px;
  border-top: #d6d3ce 1px solid;
  padding-top: 2px;
  font-size: 8pt;
  color: #a0a0a0;
}

.footer a {
  color: #a0a0a0;
}

.right {
  float: right;
}

table.coverage {
  empty-cells: show;
  border-collapse: collapse;
}

table.coverage thead {
  background-color: #e0e0e0;
}

table.coverage thead td {
  white-space: nowrap;
  padding: 2px 14px 0px 6px;
  border-bottom: #b0b0b0 1px solid;
}

table.coverage tbody td {
  white-space: nowrap;
  padding: 2px 6px 2px 6px;
  border-bottom: #d6d3ce 1px solid;
}

table.coverage tfoot td {
  white-space: nowrap;
  padding: 2px 6px 2px 6px;
  font-weight: bold;
}

table.coverage .ctr1,
table.coverage .ctr2 {
  text-align: right;
}

pre.source {
  border: #d6d3ce 1px solid;
  font-family: monospace;
}

pre.source span {
  display: inline-block;
  width: 100%;
}

.nc {
  background-color: #fdd;
}

.pc {
  background-color: #ffd;
}

.fc {
  background-color: #dfd;
}

.bnc,
.bpc,
.bfc {
  padding-left: 18px;
}

.bnc {
  border-left: #d00 4px solid;
}

.bpc {
  border-left: #dd0 4px solid;
}

.bfc {
  border-left: #0d0 4px solid;
}
"#;
