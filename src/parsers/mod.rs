pub mod html;
pub mod product;

#[cfg(test)]
mod tests;

pub use product::{
    ProductPrice, Reference, clean_text, extract_img_url, extract_reference, parse_price,
    split_product_price,
};
