//! Static page copy

use cedros_core::parallax::ParallaxLayerSpec;

#[derive(Debug, Clone)]
pub struct Feature {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone)]
pub struct GalleryImage {
    pub id: &'static str,
    pub alt: &'static str,
    pub caption: &'static str,
}

#[derive(Debug, Clone)]
pub struct Amenity {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone)]
pub struct PageContent {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub parallax_heading: &'static str,
    pub features: Vec<Feature>,
    pub gallery: Vec<GalleryImage>,
    pub amenities: Vec<Amenity>,
    pub parallax_layers: Vec<ParallaxLayerSpec>,
    pub contact_heading: &'static str,
    pub contact_button: &'static str,
}

impl Default for PageContent {
    fn default() -> Self {
        Self {
            title: "Los Cedros",
            subtitle: "116 Casas Exclusivas de Lujo",
            parallax_heading: "Vivir entre cedros",
            features: vec![
                Feature {
                    id: "security",
                    title: "Seguridad Total",
                    description: "Urbanizacion privada con vigilancia 24/7 y control de acceso.",
                },
                Feature {
                    id: "finishes",
                    title: "Acabados Premium",
                    description: "Marmol italiano, cocinas europeas y domotica integrada.",
                },
                Feature {
                    id: "environment",
                    title: "Entorno Natural",
                    description: "Senderos, jardines paisajisticos y vistas panoramicas.",
                },
            ],
            gallery: vec![
                GalleryImage {
                    id: "1",
                    alt: "Fachada principal Los Cedros",
                    caption: "Arquitectura contemporanea",
                },
                GalleryImage {
                    id: "2",
                    alt: "Interior sala de estar",
                    caption: "Espacios amplios y luminosos",
                },
                GalleryImage {
                    id: "3",
                    alt: "Cocina moderna",
                    caption: "Cocinas equipadas de lujo",
                },
                GalleryImage {
                    id: "4",
                    alt: "Dormitorio principal",
                    caption: "Confort y elegancia",
                },
                GalleryImage {
                    id: "5",
                    alt: "Jardin privado",
                    caption: "Espacios exteriores unicos",
                },
            ],
            amenities: vec![
                Amenity {
                    id: "pool",
                    title: "Piscina",
                    description: "Semi-olimpica climatizada",
                },
                Amenity {
                    id: "security",
                    title: "Seguridad",
                    description: "Vigilancia 24/7",
                },
                Amenity {
                    id: "gym",
                    title: "Gimnasio",
                    description: "Centro fitness equipado",
                },
                Amenity {
                    id: "club",
                    title: "Club House",
                    description: "Salon de eventos",
                },
                Amenity {
                    id: "playground",
                    title: "Area Infantil",
                    description: "Juegos seguros",
                },
                Amenity {
                    id: "green",
                    title: "Areas Verdes",
                    description: "Jardines y senderos",
                },
            ],
            parallax_layers: vec![
                layer("background", 0.3, 1),
                layer("midground", 0.6, 2),
                layer("foreground", 0.9, 3),
            ],
            contact_heading: "Agenda tu visita",
            contact_button: "Contactar",
        }
    }
}

fn layer(id: &str, speed: f64, z_index: i32) -> ParallaxLayerSpec {
    ParallaxLayerSpec {
        id: id.to_string(),
        image_src: String::new(),
        speed,
        z_index,
    }
}
