//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations/`
//! exactly; `diesel print-schema` can regenerate them from a live database.

diesel::table! {
    /// Seller accounts. The phone number doubles as the login identifier.
    users (id) {
        id -> BigInt,
        display_name -> Varchar,
        phone_number -> Varchar,
        phone_number_2 -> Nullable<Varchar>,
        phone_number_3 -> Nullable<Varchar>,
        password_hash -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Top level of the category hierarchy.
    main_categories (id) {
        id -> BigInt,
        name -> Varchar,
    }
}

diesel::table! {
    /// Second level of the category hierarchy; products reference this.
    sub_categories (id) {
        id -> BigInt,
        main_category_id -> BigInt,
        name -> Varchar,
    }
}

diesel::table! {
    /// Brands, registered under one subcategory each.
    brands (id) {
        id -> BigInt,
        sub_category_id -> BigInt,
        name -> Varchar,
    }
}

diesel::table! {
    /// Item conditions (new, like new, used, ...).
    conditions (id) {
        id -> BigInt,
        name -> Varchar,
    }
}

diesel::table! {
    /// Cities.
    cities (id) {
        id -> BigInt,
        name -> Varchar,
    }
}

diesel::table! {
    /// Districts within a city.
    districts (id) {
        id -> BigInt,
        city_id -> BigInt,
        name -> Varchar,
    }
}

diesel::table! {
    /// Communes within a district.
    communes (id) {
        id -> BigInt,
        district_id -> BigInt,
        name -> Varchar,
    }
}

diesel::table! {
    /// Contact records, 1:1 with a product; created first so the product row
    /// can embed the id as a foreign key.
    product_details (id) {
        id -> BigInt,
        contact_name -> Varchar,
        email -> Nullable<Varchar>,
        phone_number -> Varchar,
        phone_number_2 -> Nullable<Varchar>,
        phone_number_3 -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Product listings.
    products (id) {
        id -> BigInt,
        name -> Varchar,
        price -> Double,
        description -> Text,
        sub_category_id -> BigInt,
        brand_id -> Nullable<BigInt>,
        condition_id -> Nullable<BigInt>,
        city_id -> BigInt,
        district_id -> BigInt,
        commune_id -> BigInt,
        address -> Varchar,
        latitude -> Nullable<Double>,
        longitude -> Nullable<Double>,
        discount -> Nullable<Double>,
        discount_as_percentage -> Bool,
        is_free_delivery -> Bool,
        detail_id -> BigInt,
        user_id -> BigInt,
        is_active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Product images. `sort_order` is the 1-based upload position.
    product_images (id) {
        id -> BigInt,
        product_id -> BigInt,
        photo -> Varchar,
        sort_order -> Integer,
    }
}
