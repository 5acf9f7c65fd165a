pub mod landing;
pub mod records;
