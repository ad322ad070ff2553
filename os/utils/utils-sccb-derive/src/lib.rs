//! # SCCB Layout Derive
//!
//! This crate provides a derive macro that turns a plain struct into a typed
//! view of a big-endian service-call control block (SCCB) region.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitInt, Type, parse_macro_input, spanned::Spanned};

/// Derive to generate `decode(&[u8]) -> Option<Self>` and
/// `encode(&self, &mut [u8]) -> Option<()>` from per-field byte offsets, plus
/// an `ENCODED_LEN` constant covering the highest field end.
///
/// - Every named field needs `#[sccb(offset = N)]`.
/// - Integer fields are stored big-endian; `[u8; N]` fields are copied verbatim.
/// - Both functions return `None` if the buffer is too short.
///
/// # Example
///
/// ```
/// use utils_sccb_derive::SccbLayout;
///
/// #[derive(SccbLayout)]
/// struct Header {
///     #[sccb(offset = 0)]
///     length: u16,
///     #[sccb(offset = 3)]
///     mask: [u8; 3],
///     #[sccb(offset = 6)]
///     response: u16,
/// }
///
/// let bytes = [0x10, 0x00, 0xff, 0x00, 0x00, 0x80, 0x00, 0x20];
/// let h = Header::decode(&bytes).unwrap();
/// assert_eq!(h.length, 0x1000);
/// assert_eq!(h.mask, [0, 0, 0x80]);
/// assert_eq!(h.response, 0x20);
/// assert_eq!(Header::ENCODED_LEN, 8);
///
/// let mut out = [0u8; 8];
/// h.encode(&mut out).unwrap();
/// assert_eq!(out[..2], bytes[..2]);
/// assert!(Header::decode(&bytes[..7]).is_none());
/// ```
#[proc_macro_derive(SccbLayout, attributes(sccb))]
pub fn derive_sccb_layout(input: TokenStream) -> TokenStream {
    let DeriveInput {
        ident,
        generics,
        data,
        ..
    } = parse_macro_input!(input as DeriveInput);

    let fields = match data {
        Data::Struct(s) => match s.fields {
            Fields::Named(n) => n.named,
            Fields::Unnamed(u) => {
                return syn::Error::new(u.span(), "SccbLayout only supports named fields")
                    .to_compile_error()
                    .into();
            }
            Fields::Unit => {
                return syn::Error::new(ident.span(), "SccbLayout does not apply to unit structs")
                    .to_compile_error()
                    .into();
            }
        },
        _ => {
            return syn::Error::new(ident.span(), "SccbLayout can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut decoders = Vec::new();
    let mut encoders = Vec::new();
    let mut ends = Vec::new();

    for field in fields {
        let Some(fname) = &field.ident else { continue };
        let offset = match field_offset(&field.attrs) {
            Ok(Some(offset)) => offset,
            Ok(None) => {
                return syn::Error::new(field.span(), "missing #[sccb(offset = N)]")
                    .to_compile_error()
                    .into();
            }
            Err(e) => return e.to_compile_error().into(),
        };

        let ty = &field.ty;
        let range = quote! { #offset..#offset + ::core::mem::size_of::<#ty>() };
        ends.push(quote! { #offset + ::core::mem::size_of::<#ty>() });

        if is_byte_array(ty) {
            decoders.push(quote! {
                #fname: bytes.get(#range)?.try_into().ok()?
            });
            encoders.push(quote! {
                bytes.get_mut(#range)?.copy_from_slice(&self.#fname);
            });
        } else {
            decoders.push(quote! {
                #fname: <#ty>::from_be_bytes(bytes.get(#range)?.try_into().ok()?)
            });
            encoders.push(quote! {
                bytes.get_mut(#range)?.copy_from_slice(&self.#fname.to_be_bytes());
            });
        }
    }

    let expanded = quote! {
        impl #impl_generics #ident #ty_generics #where_clause {
            /// Number of bytes from the start of the block up to the end of the last field.
            pub const ENCODED_LEN: usize = {
                let mut end = 0usize;
                #(
                    let field_end = #ends;
                    if field_end > end {
                        end = field_end;
                    }
                )*
                end
            };

            /// Read all fields from `bytes` (big-endian).
            #[inline]
            #[must_use]
            pub fn decode(bytes: &[u8]) -> ::core::option::Option<Self> {
                ::core::option::Option::Some(Self {
                    #(#decoders,)*
                })
            }

            /// Write all fields into `bytes` (big-endian), leaving other bytes untouched.
            #[inline]
            #[must_use]
            pub fn encode(&self, bytes: &mut [u8]) -> ::core::option::Option<()> {
                #(#encoders)*
                ::core::option::Option::Some(())
            }
        }
    };

    TokenStream::from(expanded)
}

fn field_offset(attrs: &[syn::Attribute]) -> syn::Result<Option<usize>> {
    let mut offset = None;
    for attr in attrs {
        if !attr.path().is_ident("sccb") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("offset") {
                let lit: LitInt = meta.value()?.parse()?;
                offset = Some(lit.base10_parse::<usize>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported sccb attribute, expected `offset = N`"))
            }
        })?;
    }
    Ok(offset)
}

fn is_byte_array(ty: &Type) -> bool {
    let Type::Array(array) = ty else {
        return false;
    };
    matches!(&*array.elem, Type::Path(p) if p.path.is_ident("u8"))
}
