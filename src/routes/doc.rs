use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, Profile, RegisterRequest},
        catalog::{
            CategoryList, ColorList, CreateCategoryRequest, CreateColorRequest, CreateSizeRequest,
            SizeList, UpdateCategoryRequest, UpdateColorRequest, UpdateSizeRequest,
        },
        order_products::{CreateOrderProductRequest, OrderProductList, UpdateOrderProductRequest},
        orders::{
            AddOrderProductsRequest, CartLine, CheckoutRequest, OrderContact, OrderLine, OrderList,
            OrderWithItems, UpdateOrderStatusRequest,
        },
        product_images::{BulkImageUpload, ImageUpload, ProductImageList, UpdateImageRequest},
        products::{
            AttachColorsRequest, AttachSizesRequest, CategorySummary, CreateProductRequest,
            ProductColorList, ProductDetail, ProductList, ProductSizeList, UpdateProductRequest,
        },
        users::{
            AdminList, CreateAdminRequest, CreateUserRequest, UpdateAdminRequest,
            UpdateUserRequest, UserList,
        },
    },
    error::ErrorBody,
    middleware::auth::Role,
    models::{Admin, Category, Color, Order, OrderProduct, OrderStatus, Product, ProductImage, Size, User},
    response::{ApiResponse, Meta},
    routes::{
        admins, auth, categories, colors, health, order_products, orders, params, product_images,
        products, sizes, users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::profile,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::list_colors,
        products::attach_colors,
        products::detach_color,
        products::list_sizes,
        products::attach_sizes,
        products::detach_size,
        products::upload_main_image,
        product_images::list_images,
        product_images::upload_image,
        product_images::upload_images_bulk,
        product_images::update_image,
        product_images::set_primary,
        product_images::delete_image,
        orders::list_orders,
        orders::list_my_orders,
        orders::checkout,
        orders::create_order,
        orders::add_order_products,
        orders::get_order,
        orders::update_order_status,
        orders::delete_order,
        order_products::list_order_products,
        order_products::get_order_product,
        order_products::create_order_product,
        order_products::update_order_product,
        order_products::delete_order_product,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        colors::list_colors,
        colors::get_color,
        colors::create_color,
        colors::update_color,
        colors::delete_color,
        sizes::list_sizes,
        sizes::get_size,
        sizes::create_size,
        sizes::update_size,
        sizes::delete_size,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        admins::list_admins,
        admins::get_admin,
        admins::create_admin,
        admins::update_admin,
        admins::delete_admin
    ),
    components(
        schemas(
            Category,
            Color,
            Size,
            Product,
            ProductImage,
            User,
            Admin,
            Order,
            OrderStatus,
            OrderProduct,
            Role,
            Profile,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CreateColorRequest,
            UpdateColorRequest,
            CreateSizeRequest,
            UpdateSizeRequest,
            CategoryList,
            ColorList,
            SizeList,
            CreateProductRequest,
            UpdateProductRequest,
            AttachColorsRequest,
            AttachSizesRequest,
            CategorySummary,
            ProductDetail,
            ProductList,
            ProductColorList,
            ProductSizeList,
            UpdateImageRequest,
            ProductImageList,
            ImageUpload,
            BulkImageUpload,
            OrderContact,
            CartLine,
            CheckoutRequest,
            AddOrderProductsRequest,
            UpdateOrderStatusRequest,
            OrderLine,
            OrderWithItems,
            OrderList,
            CreateOrderProductRequest,
            UpdateOrderProductRequest,
            OrderProductList,
            CreateUserRequest,
            UpdateUserRequest,
            CreateAdminRequest,
            UpdateAdminRequest,
            UserList,
            AdminList,
            params::Pagination,
            params::SortOrder,
            params::ProductSortBy,
            ErrorBody,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductDetail>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and profile"),
        (name = "Products", description = "Product catalogue and variants"),
        (name = "Product Images", description = "Product image gallery"),
        (name = "Orders", description = "Checkout and order management"),
        (name = "Order Products", description = "Order line-items"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Colors", description = "Color endpoints"),
        (name = "Sizes", description = "Size endpoints"),
        (name = "Users", description = "Customer accounts"),
        (name = "Admins", description = "Administrator accounts"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
