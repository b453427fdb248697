// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Static HTML documentation with three collapsible levels: register file, register, field.

use regen_ir::{PlacedField, RegFile, Register};

const STYLE: &str = r#"<style>
body { font-family: sans-serif; margin: 2em; }
.collapsible { background-color: #2f4f6f; color: white; cursor: pointer; padding: 8px 12px;
  width: 100%; border: none; text-align: left; outline: none; font-size: 15px; margin-top: 4px; }
.collapsible.register { background-color: #4a7399; }
.collapsible.field { background-color: #7ea3c4; color: black; }
.active, .collapsible:hover { filter: brightness(1.15); }
.content { padding: 0 18px; display: none; overflow: hidden; border-left: 2px solid #ccc; }
table { border-collapse: collapse; margin: 6px 0; }
td, th { border: 1px solid #ccc; padding: 3px 8px; text-align: left; }
</style>"#;

const SCRIPT: &str = r#"<script>
var buttons = document.getElementsByClassName("collapsible");
for (var i = 0; i < buttons.length; i++) {
  buttons[i].addEventListener("click", function() {
    this.classList.toggle("active");
    var content = this.nextElementSibling;
    content.style.display = content.style.display === "block" ? "none" : "block";
  });
}
</script>"#;

/// Escapes text for element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn row(out: &mut String, key: &str, value: &str) {
    out.push_str(&format!("<tr><th>{}</th><td>{}</td></tr>\n", key, escape(value)));
}

fn field_block(out: &mut String, field: &PlacedField) {
    let f = field.field();
    let perms = f.permissions();
    out.push_str(&format!(
        "<button type=\"button\" class=\"collapsible field\">{}</button>\n",
        escape(f.name())
    ));
    out.push_str("<div class=\"content\">\n<table>\n");
    row(out, "Description", f.description());
    row(out, "Width", &f.width().to_string());
    row(out, "Offset", &field.offset().to_string());
    row(out, "Reset value", &format!("{:#x}", f.reset_value()));
    row(out, "SW read", &perms.sw_rd().to_string());
    row(out, "SW write", &perms.sw_wr().to_string());
    row(out, "HW read", &perms.hw_rd().to_string());
    row(out, "HW write", &perms.hw_wr().to_string());
    out.push_str("</table>\n</div>\n");
}

fn register_block(out: &mut String, reg: &Register) {
    out.push_str(&format!(
        "<button type=\"button\" class=\"collapsible register\">{} @ {:#x}</button>\n",
        escape(reg.name()),
        reg.address()
    ));
    out.push_str("<div class=\"content\">\n<table>\n");
    row(out, "Description", reg.description());
    row(out, "Address", &format!("{:#x}", reg.address()));
    row(out, "Width", &reg.width().to_string());
    out.push_str("</table>\n");
    for field in reg.fields() {
        field_block(out, field);
    }
    out.push_str("</div>\n");
}

/// Standalone documentation page with inlined style and script.
pub fn render_html(rgf: &RegFile) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape(rgf.name())));
    out.push_str(&format!("{}\n</head>\n<body>\n", STYLE));
    out.push_str(&format!(
        "<button type=\"button\" class=\"collapsible\">{}</button>\n",
        escape(rgf.name())
    ));
    out.push_str(&format!("<div class=\"content\">\n<p>{}</p>\n", escape(rgf.description())));
    for reg in rgf.registers() {
        register_block(&mut out, reg);
    }
    out.push_str(&format!("</div>\n{}\n</body>\n</html>\n", SCRIPT));
    out
}
