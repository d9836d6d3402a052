pub mod admins;
pub mod categories;
pub mod colors;
pub mod order_products;
pub mod orders;
pub mod product_colors;
pub mod product_images;
pub mod product_sizes;
pub mod products;
pub mod sizes;
pub mod users;

pub use admins::Entity as Admins;
pub use categories::Entity as Categories;
pub use colors::Entity as Colors;
pub use order_products::Entity as OrderProducts;
pub use orders::Entity as Orders;
pub use product_colors::Entity as ProductColors;
pub use product_images::Entity as ProductImages;
pub use product_sizes::Entity as ProductSizes;
pub use products::Entity as Products;
pub use sizes::Entity as Sizes;
pub use users::Entity as Users;
