use garnet_noc::config::{NetworkConfig,RouterConfig,RoutingAlgorithm,SwizzlePolicy,VnetClass};

/// Parameters for building a `RouterConfig` in a test without repeating every field.
pub struct RouterConfigBuilder
{
    pub vcs_per_vnet: usize,
    pub buffers_per_data_vc: usize,
    pub routing_algorithm: RoutingAlgorithm,
    pub swizzle_swap: bool,
}

impl Default for RouterConfigBuilder
{
    fn default() -> Self
    {
        RouterConfigBuilder{
            vcs_per_vnet: 1,
            buffers_per_data_vc: 4,
            routing_algorithm: RoutingAlgorithm::Xy,
            swizzle_swap: false,
        }
    }
}

pub fn build_router_config(arg:RouterConfigBuilder) -> RouterConfig
{
    let mut config = RouterConfig::default();
    config.vcs_per_vnet = arg.vcs_per_vnet;
    config.vnets = vec![VnetClass::Data];
    config.buffers_per_data_vc = arg.buffers_per_data_vc;
    config.routing_algorithm = arg.routing_algorithm;
    config.swizzle_swap = arg.swizzle_swap;
    if arg.swizzle_swap
    {
        config.policy = Some(SwizzlePolicy::Minimal);
    }
    config
}

/// Parameters for building a `NetworkConfig` in a test without repeating every field.
pub struct NetworkConfigBuilder
{
    pub num_rows: usize,
    pub num_cols: usize,
    pub torus: bool,
    pub router: RouterConfig,
}

pub fn build_network_config(arg:NetworkConfigBuilder) -> NetworkConfig
{
    let mut config = NetworkConfig::default();
    config.num_rows = Some(arg.num_rows);
    config.num_cols = arg.num_cols;
    config.torus = arg.torus;
    config.router = arg.router;
    config
}
