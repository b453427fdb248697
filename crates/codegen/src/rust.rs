// Regen - Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use proc_macro2::{Ident, Literal, TokenStream};
use quote::{format_ident, quote};
use regen_ir::{width_mask, PlacedField, RegFile, Register};

/// Rust accessor bindings for a register file.
pub struct BindingGenerator;

/// Method names every register struct defines itself.
const RESERVED_METHODS: [&str; 4] = ["reset", "new", "raw", "set_raw"];

/// Keywords that cannot be written as raw identifiers.
const NON_RAW_KEYWORDS: [&str; 5] = ["self", "Self", "super", "crate", "_"];

impl BindingGenerator {
    pub fn generate(rgf: &RegFile) -> Result<String> {
        let mod_name = Self::ident(&rgf.name().to_lowercase());
        let description = rgf.description();
        let address_width = rgf.address_width();

        let mut registers_code = Vec::new();
        for reg in rgf.registers() {
            registers_code.push(Self::generate_register(reg)?);
        }

        let expanded = quote! {
            #[doc = #description]
            pub mod #mod_name {
                pub const ADDRESS_WIDTH: u32 = #address_width;

                #(#registers_code)*
            }
        };

        // Round-trip through syn so a bad identifier fails here and not in the user's build.
        syn::parse2::<syn::File>(expanded.clone())
            .with_context(|| format!("generated bindings for '{}' do not parse", rgf.name()))?;
        Ok(expanded.to_string())
    }

    fn word_type(width: u32) -> Ident {
        match width {
            0..=8 => format_ident!("u8"),
            9..=16 => format_ident!("u16"),
            17..=32 => format_ident!("u32"),
            _ => format_ident!("u64"),
        }
    }

    fn struct_name(name: &str) -> String {
        name.split('_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<String>()
    }

    /// Plain identifier when `syn` accepts it, raw identifier for other keywords.
    fn ident(name: &str) -> Ident {
        if syn::parse_str::<Ident>(name).is_ok() {
            format_ident!("{}", name)
        } else if NON_RAW_KEYWORDS.contains(&name) {
            format_ident!("{}_", name)
        } else {
            format_ident!("r#{}", name)
        }
    }

    fn generate_register(reg: &Register) -> Result<TokenStream> {
        let mut name = Self::struct_name(reg.name());
        if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
            name = format!("Reg{}", name);
        }
        let struct_name = Self::ident(&name);
        let word = Self::word_type(reg.width());
        let address = Literal::u64_unsuffixed(reg.address());
        let reset_value = Literal::u64_unsuffixed(reg.reset_value());
        let width = reg.width();
        let description = reg.description();

        let mut field_methods = Vec::new();
        for field in reg.fields() {
            field_methods.push(Self::generate_field(field, &word)?);
        }

        let expanded = quote! {
            #[doc = #description]
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct #struct_name(#word);

            impl #struct_name {
                pub const ADDRESS: u64 = #address;
                pub const WIDTH: u32 = #width;
                pub const RESET_VALUE: #word = #reset_value;

                pub fn new() -> Self {
                    Self(Self::RESET_VALUE)
                }

                pub fn reset(&mut self) {
                    self.0 = Self::RESET_VALUE;
                }

                #(#field_methods)*

                pub fn raw(&self) -> #word {
                    self.0
                }

                pub fn set_raw(&mut self, value: #word) {
                    self.0 = value;
                }
            }

            impl Default for #struct_name {
                fn default() -> Self {
                    Self::new()
                }
            }
        };

        Ok(expanded)
    }

    fn generate_field(field: &PlacedField, word: &Ident) -> Result<TokenStream> {
        let f = field.field();
        let perms = f.permissions();
        let name_str = f.name().to_lowercase();
        // Avoid collision with register methods
        let name_str = if RESERVED_METHODS.contains(&name_str.as_str()) {
            format!("{}_field", name_str)
        } else {
            name_str
        };

        let name = Self::ident(&name_str);
        let set_name = format_ident!("set_{}", name_str.trim_start_matches('_'));
        let bit_offset = field.offset();
        let mask = Literal::u64_unsuffixed(width_mask(field.width()));
        let description = f.description();

        let getter = if perms.sw_rd() {
            quote! {
                #[doc = #description]
                pub fn #name(&self) -> #word {
                    (self.0 >> #bit_offset) & #mask
                }
            }
        } else {
            quote! {}
        };

        let setter = if perms.sw_wr() {
            quote! {
                #[doc = #description]
                pub fn #set_name(&mut self, value: #word) {
                    let value_masked = value & #mask;
                    self.0 &= !(#mask << #bit_offset);
                    self.0 |= value_masked << #bit_offset;
                }
            }
        } else {
            quote! {}
        };

        Ok(quote! {
            #getter
            #setter
        })
    }
}

/// Rust bindings of `rgf` as source text.
pub fn render_rust(rgf: &RegFile) -> Result<String> {
    BindingGenerator::generate(rgf)
}
