use crate::models::{Product, ProductId};

struct Entry {
    id: ProductId,
    name: &'static str,
    price: f64,
    category: &'static str,
    image: &'static str,
    description: &'static str,
}

const ENTRIES: &[Entry] = &[
    Entry {
        id: 1,
        name: "Camisa Satín",
        price: 129.99,
        category: "Camisas",
        image: "/images/camisa.webp",
        description: "Elegante camisa de satín, perfecta para ocasiones formales.",
    },
    Entry {
        id: 2,
        name: "Chaleco",
        price: 119.99,
        category: "Chalecos",
        image: "/images/chaleco.jpg",
        description: "Chaleco versátil que complementa cualquier conjunto elegante.",
    },
    Entry {
        id: 3,
        name: "Cinturón",
        price: 70.99,
        category: "Accesorios",
        image: "/images/cinturon.avif",
        description: "Cinturón de cuero de alta calidad para un toque de distinción.",
    },
    Entry {
        id: 4,
        name: "Corbata",
        price: 99.99,
        category: "Accesorios",
        image: "/images/corbata.webp",
        description: "Corbata elegante para completar tu look formal.",
    },
    Entry {
        id: 5,
        name: "Traje",
        price: 450.99,
        category: "Trajes",
        image: "/images/elegante.jpg",
        description: "Traje completo para ocasiones que requieren máxima elegancia.",
    },
    Entry {
        id: 6,
        name: "Gemelos",
        price: 365.99,
        category: "Accesorios",
        image: "/images/gemelos.jpg",
        description: "Gemelos sofisticados para un toque de lujo en tu atuendo.",
    },
    Entry {
        id: 7,
        name: "Traje Sport",
        price: 436.99,
        category: "Trajes",
        image: "/images/sport.jpg",
        description: "Traje sport para un look elegante pero relajado.",
    },
    Entry {
        id: 8,
        name: "Zapatos",
        price: 326.99,
        category: "Calzado",
        image: "/images/zapatos.jpg",
        description: "Zapatos de cuero fino para complementar tu vestimenta.",
    },
];

impl Entry {
    fn to_product(&self) -> Product {
        Product {
            id: self.id,
            name: self.name.to_string(),
            price: self.price,
            category: self.category.to_string(),
            image: self.image.to_string(),
            description: self.description.to_string(),
        }
    }
}

pub fn all() -> Vec<Product> {
    ENTRIES.iter().map(Entry::to_product).collect()
}

pub fn find(id: ProductId) -> Option<Product> {
    ENTRIES.iter().find(|e| e.id == id).map(Entry::to_product)
}

/// Case-insensitive match on name or description. A blank query lists everything.
pub fn search(query: &str) -> Vec<Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return all();
    }
    ENTRIES
        .iter()
        .filter(|e| {
            e.name.to_lowercase().contains(&needle) || e.description.to_lowercase().contains(&needle)
        })
        .map(Entry::to_product)
        .collect()
}

pub fn by_category(category: &str) -> Vec<Product> {
    ENTRIES
        .iter()
        .filter(|e| e.category.eq_ignore_ascii_case(category.trim()))
        .map(Entry::to_product)
        .collect()
}
